//! Tagged payloads and the tables that rebuild them
//!
//! Every serialized element, layer and map is a JSON object carrying its
//! type name under [`CLASS_KEY`]. A [`DeserializerRegistry`] maps those
//! names back to constructor functions, one table per payload kind.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::{PayloadKind, SerializationError};

/// Key holding the type tag of a payload
pub const CLASS_KEY: &str = "__class__";

/// Serialize `value` and attach `class` under [`CLASS_KEY`]
pub fn tagged<T: Serialize + ?Sized>(class: &str, value: &T) -> Result<Value, SerializationError> {
    let mut payload = serde_json::to_value(value)?;
    match payload.as_object_mut() {
        Some(object) => {
            object.insert(CLASS_KEY.to_string(), Value::String(class.to_string()));
            Ok(payload)
        }
        None => Err(SerializationError::WrongKind {
            expected: "object".to_string(),
            found: class.to_string(),
        }),
    }
}

/// The type tag of a payload
pub fn class_of(payload: &Value) -> Result<&str, SerializationError> {
    payload
        .get(CLASS_KEY)
        .and_then(Value::as_str)
        .ok_or(SerializationError::MissingClass)
}

/// Fail unless the payload is tagged `expected`
pub fn expect_class(payload: &Value, expected: &str) -> Result<(), SerializationError> {
    let found = class_of(payload)?;
    if found == expected {
        Ok(())
    } else {
        Err(SerializationError::WrongKind {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

pub fn field<'a>(payload: &'a Value, key: &str) -> Result<&'a Value, SerializationError> {
    payload
        .get(key)
        .ok_or_else(|| SerializationError::MissingField(key.to_string()))
}

/// Deserialize one required field
pub fn parse_field<T: DeserializeOwned>(payload: &Value, key: &str) -> Result<T, SerializationError> {
    Ok(T::deserialize(field(payload, key)?)?)
}

/// Deserialize an optional field, falling back to `T::default()`
pub fn parse_field_or_default<T: DeserializeOwned + Default>(
    payload: &Value,
    key: &str,
) -> Result<T, SerializationError> {
    match payload.get(key) {
        Some(Value::Null) | None => Ok(T::default()),
        Some(value) => Ok(T::deserialize(value)?),
    }
}

pub type ElementDeserializer<E> = fn(&Value) -> Result<E, SerializationError>;
pub type LayerDeserializer<E, L, M, C> =
    fn(&Value, &DeserializerRegistry<E, L, M, C>, &mut C) -> Result<L, SerializationError>;
pub type MapDeserializer<E, L, M, C> =
    fn(&Value, &DeserializerRegistry<E, L, M, C>, &mut C) -> Result<M, SerializationError>;

/// Tag -> constructor tables for elements, layers and maps.
///
/// `C` is a caller-owned context threaded through layer and map
/// construction, such as a cache of already loaded tilesets. Layer and map
/// constructors receive the registry itself so nested payloads can be
/// rebuilt through it.
pub struct DeserializerRegistry<E, L, M, C> {
    elements: HashMap<String, ElementDeserializer<E>>,
    layers: HashMap<String, LayerDeserializer<E, L, M, C>>,
    maps: HashMap<String, MapDeserializer<E, L, M, C>>,
}

impl<E, L, M, C> DeserializerRegistry<E, L, M, C> {
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            layers: HashMap::new(),
            maps: HashMap::new(),
        }
    }

    /// Registering a tag again replaces its constructor
    pub fn register_element(&mut self, tag: &str, deserializer: ElementDeserializer<E>) {
        self.elements.insert(tag.to_string(), deserializer);
    }

    pub fn register_layer(&mut self, tag: &str, deserializer: LayerDeserializer<E, L, M, C>) {
        self.layers.insert(tag.to_string(), deserializer);
    }

    pub fn register_map(&mut self, tag: &str, deserializer: MapDeserializer<E, L, M, C>) {
        self.maps.insert(tag.to_string(), deserializer);
    }

    pub fn has_element(&self, tag: &str) -> bool {
        self.elements.contains_key(tag)
    }

    pub fn has_layer(&self, tag: &str) -> bool {
        self.layers.contains_key(tag)
    }

    pub fn has_map(&self, tag: &str) -> bool {
        self.maps.contains_key(tag)
    }

    pub fn deserialize_element(&self, payload: &Value) -> Result<E, SerializationError> {
        let tag = class_of(payload)?;
        let deserializer = self
            .elements
            .get(tag)
            .ok_or_else(|| unknown(PayloadKind::Element, tag))?;
        deserializer(payload)
    }

    pub fn deserialize_layer(&self, payload: &Value, context: &mut C) -> Result<L, SerializationError> {
        let tag = class_of(payload)?;
        let deserializer = self
            .layers
            .get(tag)
            .ok_or_else(|| unknown(PayloadKind::Layer, tag))?;
        deserializer(payload, self, context)
    }

    pub fn deserialize_map(&self, payload: &Value, context: &mut C) -> Result<M, SerializationError> {
        let tag = class_of(payload)?;
        let deserializer = self
            .maps
            .get(tag)
            .ok_or_else(|| unknown(PayloadKind::Map, tag))?;
        deserializer(payload, self, context)
    }
}

fn unknown(kind: PayloadKind, tag: &str) -> SerializationError {
    SerializationError::UnknownTag {
        kind,
        tag: tag.to_string(),
    }
}

impl<E, L, M, C> Default for DeserializerRegistry<E, L, M, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L, M, C> fmt::Debug for DeserializerRegistry<E, L, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements: Vec<&String> = self.elements.keys().collect();
        let mut layers: Vec<&String> = self.layers.keys().collect();
        let mut maps: Vec<&String> = self.maps.keys().collect();
        elements.sort();
        layers.sort();
        maps.sort();
        f.debug_struct("DeserializerRegistry")
            .field("elements", &elements)
            .field("layers", &layers)
            .field("maps", &maps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridElement, GridLayer, Position, Tile};
    use serde::Deserialize;
    use serde_json::json;

    type TestRegistry = DeserializerRegistry<Tile, GridLayer<Tile>, Vec<GridLayer<Tile>>, usize>;

    fn tile_from(payload: &Value) -> Result<Tile, SerializationError> {
        Ok(Tile::deserialize(payload)?)
    }

    fn layer_from(
        payload: &Value,
        registry: &TestRegistry,
        loaded: &mut usize,
    ) -> Result<GridLayer<Tile>, SerializationError> {
        let mut layer = GridLayer::new(parse_field::<String>(payload, "name")?);
        let elements: Vec<Value> = parse_field(payload, "elements")?;
        for element in &elements {
            layer.add_element(registry.deserialize_element(element)?);
        }
        *loaded += 1;
        Ok(layer)
    }

    fn map_from(
        payload: &Value,
        registry: &TestRegistry,
        loaded: &mut usize,
    ) -> Result<Vec<GridLayer<Tile>>, SerializationError> {
        let layers: Vec<Value> = parse_field(payload, "layers")?;
        layers
            .iter()
            .map(|layer| registry.deserialize_layer(layer, loaded))
            .collect()
    }

    fn registry() -> TestRegistry {
        let mut registry = TestRegistry::new();
        registry.register_element("Tile", tile_from);
        registry.register_layer("Layer", layer_from);
        registry.register_map("Map", map_from);
        registry
    }

    #[test]
    fn test_tagged_attaches_class() {
        let tile = Tile::new(Position::new(1, 2), "wall");
        let payload = tile.to_tagged().unwrap();
        assert_eq!(class_of(&payload).unwrap(), "Tile");
        assert_eq!(payload["name"], "wall");
        assert_eq!(payload["position"], json!([1, 2]));
    }

    #[test]
    fn test_tagged_rejects_non_objects() {
        assert!(matches!(
            tagged("Number", &3),
            Err(SerializationError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_missing_class() {
        let registry = registry();
        assert!(matches!(
            registry.deserialize_element(&json!({"name": "wall"})),
            Err(SerializationError::MissingClass)
        ));
    }

    #[test]
    fn test_unknown_tag_names_kind() {
        let registry = registry();
        let err = registry
            .deserialize_layer(&json!({"__class__": "Nope"}), &mut 0)
            .unwrap_err();
        match err {
            SerializationError::UnknownTag { kind, tag } => {
                assert_eq!(kind, PayloadKind::Layer);
                assert_eq!(tag, "Nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_payloads_share_context() {
        let registry = registry();
        let payload = json!({
            "__class__": "Map",
            "layers": [
                {
                    "__class__": "Layer",
                    "name": "walls",
                    "elements": [Tile::new(Position::new(0, 0), "wall").to_tagged().unwrap()],
                },
                {"__class__": "Layer", "name": "floor", "elements": []},
            ],
        });

        let mut loaded = 0;
        let layers = registry.deserialize_map(&payload, &mut loaded).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(layers.len(), 2);
        assert!(layers[0].has_element_at(Position::new(0, 0)));
        assert!(layers[1].is_empty());
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = registry();
        registry.register_element("Tile", tile_from);
        assert!(registry.has_element("Tile"));
        assert!(registry.has_layer("Layer"));
        assert!(registry.has_map("Map"));
        assert!(!registry.has_map("Layer"));
    }

    #[test]
    fn test_parse_field_errors() {
        let payload = json!({"name": 3});
        assert!(matches!(
            parse_field::<String>(&payload, "missing"),
            Err(SerializationError::MissingField(key)) if key == "missing"
        ));
        assert!(matches!(
            parse_field::<String>(&payload, "name"),
            Err(SerializationError::Json(_))
        ));
        assert_eq!(parse_field_or_default::<Vec<u32>>(&payload, "absent").unwrap(), Vec::<u32>::new());
    }
}
