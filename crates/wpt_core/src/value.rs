//! Tagged value tree operated on by test bodies and assertions.
//!
//! ## Notes
//! - `Array` and `Map` are shared nodes (`Rc<RefCell<..>>`), so a value graph may contain cycles. Strict equality on
//!   them is pointer identity, exactly like object references in the scripting model the tests come from.
//! - Arrays are sparse: a `None` slot is a hole and has no own property.
//! - `Display` follows the scripting model's string conversion (`[1, 2]` prints as `1,2`, maps as
//!   `[object Object]`) because assertion failure messages are built from it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Shared, mutable array node. `None` slots are holes.
pub type ArrayCell = Rc<RefCell<Vec<Option<Value>>>>;

/// Shared, mutable object node with insertion-ordered own properties.
pub type MapCell = Rc<RefCell<IndexMap<String, Value>>>;

/// A value as seen by assertions.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayCell),
    Map(MapCell),
}

impl Value {
    /// Build a dense array.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items.into_iter().map(Some).collect())))
    }

    /// Build an array that may contain holes.
    pub fn sparse_array(slots: impl IntoIterator<Item = Option<Value>>) -> Self {
        Value::Array(Rc::new(RefCell::new(slots.into_iter().collect())))
    }

    /// Build an object from key/value pairs, keeping their order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Build an error-like object `{ name, message }`.
    pub fn error(name: &str, message: &str) -> Self {
        Value::map([("name", Value::from(name)), ("message", Value::from(message))])
    }

    /// Build a DOMException-like object `{ name, code, message }`.
    pub fn dom_exception(name: &str, code: u16, message: &str) -> Self {
        Value::map([
            ("name", Value::from(name)),
            ("code", Value::Number(f64::from(code))),
            ("message", Value::from(message)),
        ])
    }

    /// Return the scripting-model `typeof` tag.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Map(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Whether this is a non-null object (array or map).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the node identity of an object, `None` for primitives.
    pub fn identity(&self) -> Option<*const ()> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const ()),
            Value::Map(m) => Some(Rc::as_ptr(m) as *const ()),
            _ => None,
        }
    }

    /// Enumerable own property keys, in order.
    ///
    /// ## Notes
    /// - Array keys are the indices of present (non-hole) slots; `length` is an own property but not enumerable.
    /// - Primitives have no own keys.
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            Value::Array(a) => a
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some())
                .map(|(i, _)| i.to_string())
                .collect(),
            Value::Map(m) => m.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Look up an own property.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        match self {
            Value::Array(a) => {
                let slots = a.borrow();
                if key == "length" {
                    return Some(Value::Number(slots.len() as f64));
                }
                let index = parse_index(key)?;
                slots.get(index).cloned().flatten()
            }
            Value::Map(m) => m.borrow().get(key).cloned(),
            Value::String(s) if key == "length" => Some(Value::Number(s.encode_utf16().count() as f64)),
            _ => None,
        }
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.get_own(key).is_some()
    }

    /// Property read; absent properties read as `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        self.get_own(key).unwrap_or_default()
    }

    /// Array length, `None` for non-arrays.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.borrow().len()),
            _ => None,
        }
    }

    /// Whether array slot `index` is present (not a hole, not out of bounds).
    pub fn has_index(&self, index: usize) -> bool {
        match self {
            Value::Array(a) => a.borrow().get(index).is_some_and(Option::is_some),
            _ => false,
        }
    }

    /// Read array slot `index`; holes and out-of-bounds read as `Undefined`.
    pub fn index(&self, index: usize) -> Value {
        match self {
            Value::Array(a) => a.borrow().get(index).cloned().flatten().unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// Set an own property on a map or array. Writes to primitives are ignored.
    pub fn set(&self, key: &str, value: Value) {
        match self {
            Value::Map(m) => {
                m.borrow_mut().insert(key.to_string(), value);
            }
            Value::Array(a) => {
                if let Some(index) = parse_index(key) {
                    let mut slots = a.borrow_mut();
                    if index >= slots.len() {
                        slots.resize(index + 1, None);
                    }
                    slots[index] = Some(value);
                }
            }
            _ => {}
        }
    }

    /// Append to an array. Pushes to non-arrays are ignored.
    pub fn push(&self, value: Value) {
        if let Value::Array(a) = self {
            a.borrow_mut().push(Some(value));
        }
    }

    /// Return `Object.prototype.toString`-style class string, e.g. `[object Array]`.
    pub fn class_string(&self) -> String {
        let tag = match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Map(_) => "Object",
        };
        format!("[object {tag}]")
    }
}

/// The SameValue comparison.
///
/// ## Returns
/// - `true` if both are NaN.
/// - For two zeros, `true` only if their signs match (`+0` and `-0` differ).
/// - Otherwise strict equality; objects compare by identity.
///
/// ## Examples
/// ```rust
/// use wpt_core::value::{same_value, Value};
///
/// assert!(same_value(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
/// assert!(!same_value(&Value::Number(0.0), &Value::Number(-0.0)));
/// ```
pub fn same_value(x: &Value, y: &Value) -> bool {
    if let Value::Number(b) = y {
        if b.is_nan() {
            return matches!(x, Value::Number(a) if a.is_nan());
        }
        if let Value::Number(a) = x {
            if *a == 0.0 && *b == 0.0 {
                return a.is_sign_negative() == b.is_sign_negative();
            }
        }
    }
    strict_equals(x, y)
}

/// Strict equality (`===`): NaN is unequal to itself, `+0 === -0`, objects compare by identity.
pub fn strict_equals(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Format a number the way the scripting model converts numbers to strings.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

fn parse_index(key: &str) -> Option<usize> {
    // Canonical indices only: "01" is a property name, not an index.
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<*const ()>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => f.write_str(&number_to_string(*n)),
        Value::String(s) => f.write_str(s),
        Value::Map(_) => f.write_str("[object Object]"),
        Value::Array(a) => {
            let id = Rc::as_ptr(a) as *const ();
            // Re-entering an array being printed prints nothing, as join() does.
            if seen.contains(&id) {
                return Ok(());
            }
            seen.push(id);
            for (i, slot) in a.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                match slot {
                    None | Some(Value::Undefined) | Some(Value::Null) => {}
                    Some(item) => write_value(f, item, seen)?,
                }
            }
            seen.pop();
            Ok(())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Map(m) => match m.try_borrow() {
                Ok(props) => {
                    let keys: Vec<&String> = props.keys().collect();
                    write!(f, "Map{keys:?}")
                }
                Err(_) => f.write_str("Map(<borrowed>)"),
            },
            other => write!(f, "{other}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
