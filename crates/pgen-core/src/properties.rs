//! `${name}` substitution against a layered property scope
//!
//! A [`PropertyScope`] is an immutable chain of frames. Entering a
//! sub-project pushes a frame and returns a new scope; leaving it drops the
//! scope. Nothing is shared between siblings.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}#]*)(?:#([^}]*))?\}").expect("Invalid placeholder regex"));

#[derive(Debug, Clone, Default)]
pub struct PropertyScope {
    frame: BTreeMap<String, Value>,
    parent: Option<Rc<PropertyScope>>,
}

impl PropertyScope {
    /// Outermost scope, usually the root document's `properties`.
    pub fn root(properties: &Mapping) -> Self {
        Self {
            frame: frame_from(properties),
            parent: None,
        }
    }

    /// New scope whose frame shadows every outer definition.
    pub fn push(&self, properties: &Mapping) -> Self {
        Self {
            frame: frame_from(properties),
            parent: Some(Rc::new(self.clone())),
        }
    }

    /// New scope defining only the names not already visible.
    pub fn with_defaults(&self, properties: &Mapping) -> Self {
        let frame = frame_from(properties)
            .into_iter()
            .filter(|(name, _)| self.lookup(name).is_none())
            .collect();
        Self {
            frame,
            parent: Some(Rc::new(self.clone())),
        }
    }

    /// Innermost definition of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.frame.get(name) {
                return Some(value);
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// The string value of `name`; lists, mappings and null are rejected.
    pub fn get(&self, name: &str, project: &str) -> Result<String> {
        match self.lookup(name) {
            None => Err(Error::UnresolvedProperty {
                project: project.to_string(),
                name: name.to_string(),
            }),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(_) => Err(Error::InvalidPropertyType {
                project: project.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Every visible name and its innermost value, sorted by name.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut all = match &self.parent {
            Some(parent) => parent.flatten(),
            None => BTreeMap::new(),
        };
        all.extend(self.frame.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    /// Substitute every placeholder in a string.
    pub fn substitute_str(&self, text: &str, project: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let name = caps[1].trim();
            let mut value = self.get(name, project)?;
            if let Some(method) = caps.get(2) {
                value = apply_method(&value, method.as_str().trim()).ok_or_else(|| {
                    Error::UnknownPropertyMethod {
                        project: project.to_string(),
                        name: name.to_string(),
                        method: method.as_str().to_string(),
                    }
                })?;
            }
            out.push_str(&text[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Substitute placeholders in every string of a tree. Mapping keys and
    /// non-string leaves are left as they are.
    pub fn substitute(&self, value: &Value, project: &str) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.substitute_str(s, project)?),
            Value::Sequence(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| self.substitute(item, project))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.substitute(item, project)?);
                }
                Value::Mapping(out)
            }
            Value::Tagged(tagged) => {
                let mut tagged = (**tagged).clone();
                tagged.value = self.substitute(&tagged.value, project)?;
                Value::Tagged(Box::new(tagged))
            }
            other => other.clone(),
        })
    }
}

fn frame_from(properties: &Mapping) -> BTreeMap<String, Value> {
    properties
        .iter()
        .filter_map(|(key, value)| {
            let name = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((name, value.clone()))
        })
        .collect()
}

/// Post-process a substituted value; `None` for an unknown method.
fn apply_method(value: &str, method: &str) -> Option<String> {
    Some(match method {
        "upper" => value.to_uppercase(),
        "lower" => value.to_lowercase(),
        "capitalize" => {
            let mut chars = value.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str().to_lowercase();
                    first.to_uppercase().chain(rest.chars()).collect()
                }
                None => String::new(),
            }
        }
        "title" => {
            let mut out = String::with_capacity(value.len());
            let mut word_start = true;
            for c in value.chars() {
                if c.is_alphabetic() {
                    if word_start {
                        out.extend(c.to_uppercase());
                    } else {
                        out.extend(c.to_lowercase());
                    }
                    word_start = false;
                } else {
                    out.push(c);
                    word_start = true;
                }
            }
            out
        }
        "strip" => value.trim().to_string(),
        "lstrip" => value.trim_start().to_string(),
        "rstrip" => value.trim_end().to_string(),
        "swapcase" => value
            .chars()
            .flat_map(|c| {
                if c.is_uppercase() {
                    c.to_lowercase().collect::<Vec<_>>()
                } else {
                    c.to_uppercase().collect::<Vec<_>>()
                }
            })
            .collect(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn scope() -> PropertyScope {
        PropertyScope::root(&mapping("{prop_1: pabc, prop_1_1: '1_1', prop_2_1: '2_1', n: 4}"))
    }

    #[test]
    fn resolves_nested_placeholders() {
        assert_eq!(
            scope()
                .substitute_str("sources/${prop_1_1}/${prop_2_1}_favors.c", "p")
                .unwrap(),
            "sources/1_1/2_1_favors.c"
        );
    }

    #[test]
    fn unknown_property_fails() {
        let err = scope().substitute_str("${unknown}", "p").unwrap_err();
        assert!(matches!(err, Error::UnresolvedProperty { ref name, .. } if name == "unknown"));
    }

    #[test]
    fn list_property_is_not_a_string() {
        let scope = PropertyScope::root(&mapping("{list: [a, b]}"));
        let err = scope.substitute_str("x${list}", "p").unwrap_err();
        assert!(matches!(err, Error::InvalidPropertyType { .. }));
    }

    #[test]
    fn numbers_render_as_strings() {
        assert_eq!(scope().substitute_str("cortex-m${n}", "p").unwrap(), "cortex-m4");
    }

    #[rstest]
    #[case("upper", "Hello World", "HELLO WORLD")]
    #[case("lower", "Hello World", "hello world")]
    #[case("capitalize", "hELLO wORLD", "Hello world")]
    #[case("title", "hello big-world", "Hello Big-World")]
    #[case("strip", "  x  ", "x")]
    #[case("lstrip", "  x  ", "x  ")]
    #[case("rstrip", "  x  ", "  x")]
    #[case("swapcase", "Ab", "aB")]
    fn methods(#[case] method: &str, #[case] value: &str, #[case] expected: &str) {
        let mut props = Mapping::new();
        props.insert("v".into(), value.into());
        let scope = PropertyScope::root(&props);
        assert_eq!(
            scope.substitute_str(&format!("${{v#{method}}}"), "p").unwrap(),
            expected
        );
    }

    #[test]
    fn unknown_method_fails() {
        let err = scope().substitute_str("${prop_1#reverse}", "p").unwrap_err();
        assert!(matches!(err, Error::UnknownPropertyMethod { ref method, .. } if method == "reverse"));
    }

    #[test]
    fn push_shadows_and_defaults_do_not() {
        let root = scope();
        let child = root.push(&mapping("{prop_1: child}"));
        assert_eq!(child.get("prop_1", "p").unwrap(), "child");
        assert_eq!(root.get("prop_1", "p").unwrap(), "pabc");

        let defaults = child.with_defaults(&mapping("{prop_1: module, extra: e}"));
        assert_eq!(defaults.get("prop_1", "p").unwrap(), "child");
        assert_eq!(defaults.get("extra", "p").unwrap(), "e");
    }

    #[test]
    fn substitute_leaves_keys_and_scalars() {
        let value: Value = serde_yaml::from_str("{'${prop_1}': ['${prop_1_1}', 3, true, null]}").unwrap();
        let expected: Value = serde_yaml::from_str("{'${prop_1}': ['1_1', 3, true, null]}").unwrap();
        assert_eq!(scope().substitute(&value, "p").unwrap(), expected);
    }
}
