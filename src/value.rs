//! Values and value references.
//!
//! Actions never own the state they animate. Instead they hold a
//! [`ValueRef`]: a small capability that can `read` and `write` a [`Value`]
//! living somewhere else. The set of reference kinds is closed and dispatched
//! by tag:
//!
//! - [`ValueRef::Cell`] – a shared single value
//! - [`ValueRef::ArrayIndex`] – one element of a shared array
//! - [`ValueRef::MapKey`] – one entry of a shared string-keyed map
//! - [`ValueRef::Accessor`] – a getter/setter closure pair
//! - [`ValueRef::Component`] – one axis of another reference (nested access)
//!
//! The scheduler is single-threaded, so shared storage is `Rc<RefCell<_>>`.

use arrayvec::ArrayVec;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A scalar or a small fixed-size vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(0.0)
    }
}

impl Value {
    /// Number of components (1 to 4).
    pub fn dimension(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Vec2(_) => 2,
            Value::Vec3(_) => 3,
            Value::Vec4(_) => 4,
        }
    }

    pub fn components(&self) -> ArrayVec<f64, 4> {
        match self {
            Value::Scalar(x) => [*x].into_iter().collect(),
            Value::Vec2(v) => v.iter().copied().collect(),
            Value::Vec3(v) => v.iter().copied().collect(),
            Value::Vec4(v) => v.iter().copied().collect(),
        }
    }

    /// Component `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.dimension()`.
    pub fn component(&self, axis: usize) -> f64 {
        let comps = self.components();
        assert!(
            axis < comps.len(),
            "axis {axis} out of range for {}-component value",
            comps.len()
        );
        comps[axis]
    }

    /// A value of the same shape built from `comps`.
    ///
    /// # Panics
    ///
    /// Panics if `comps.len()` does not match the shape.
    pub fn with_components(&self, comps: &[f64]) -> Value {
        assert_eq!(
            comps.len(),
            self.dimension(),
            "component count does not match value shape"
        );
        match self {
            Value::Scalar(_) => Value::Scalar(comps[0]),
            Value::Vec2(_) => Value::Vec2([comps[0], comps[1]]),
            Value::Vec3(_) => Value::Vec3([comps[0], comps[1], comps[2]]),
            Value::Vec4(_) => Value::Vec4([comps[0], comps[1], comps[2], comps[3]]),
        }
    }

    /// Same value with component `axis` replaced.
    pub fn with_component(&self, axis: usize, x: f64) -> Value {
        let mut comps = self.components();
        assert!(
            axis < comps.len(),
            "axis {axis} out of range for {}-component value",
            comps.len()
        );
        comps[axis] = x;
        self.with_components(&comps)
    }

    /// Zero value of the same shape.
    pub fn zero_like(&self) -> Value {
        self.map(|_| 0.0)
    }

    pub fn same_shape(&self, other: &Value) -> bool {
        self.dimension() == other.dimension()
    }

    /// Apply `f` to every component.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Value {
        let comps: ArrayVec<f64, 4> = self.components().into_iter().map(&mut f).collect();
        self.with_components(&comps)
    }

    /// Combine two values of the same shape component by component.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn zip_with(&self, other: &Value, mut f: impl FnMut(f64, f64) -> f64) -> Value {
        assert!(
            self.same_shape(other),
            "cannot combine a {}-component value with a {}-component value",
            self.dimension(),
            other.dimension()
        );
        let comps: ArrayVec<f64, 4> = self
            .components()
            .into_iter()
            .zip(other.components())
            .map(|(a, b)| f(a, b))
            .collect();
        self.with_components(&comps)
    }

    /// Linear interpolation towards `to`.
    pub fn lerp(&self, to: &Value, t: f64) -> Value {
        self.zip_with(to, |a, b| a + (b - a) * t)
    }

    /// Largest absolute component difference.
    pub fn distance_max(&self, other: &Value) -> f64 {
        self.components()
            .into_iter()
            .zip(other.components())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<[f64; 2]> for Value {
    fn from(v: [f64; 2]) -> Self {
        Value::Vec2(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

impl From<[f64; 4]> for Value {
    fn from(v: [f64; 4]) -> Self {
        Value::Vec4(v)
    }
}

pub type SharedValue = Rc<RefCell<Value>>;
pub type SharedArray = Rc<RefCell<Vec<Value>>>;
pub type SharedMap = Rc<RefCell<FxHashMap<String, Value>>>;

/// Handle to an external mutable value.
#[derive(Clone)]
pub enum ValueRef {
    Cell(SharedValue),
    ArrayIndex {
        array: SharedArray,
        index: usize,
    },
    MapKey {
        map: SharedMap,
        key: String,
    },
    Accessor {
        get: Rc<dyn Fn() -> Value>,
        set: Rc<dyn Fn(Value)>,
    },
    Component {
        inner: Box<ValueRef>,
        axis: usize,
    },
}

impl ValueRef {
    /// Create a fresh shared cell and a reference to it.
    pub fn new_cell(initial: impl Into<Value>) -> (ValueRef, SharedValue) {
        let cell = Rc::new(RefCell::new(initial.into()));
        (ValueRef::Cell(Rc::clone(&cell)), cell)
    }

    pub fn cell(cell: &SharedValue) -> ValueRef {
        ValueRef::Cell(Rc::clone(cell))
    }

    pub fn array_index(array: &SharedArray, index: usize) -> ValueRef {
        ValueRef::ArrayIndex {
            array: Rc::clone(array),
            index,
        }
    }

    pub fn map_key(map: &SharedMap, key: impl Into<String>) -> ValueRef {
        ValueRef::MapKey {
            map: Rc::clone(map),
            key: key.into(),
        }
    }

    pub fn accessor(get: impl Fn() -> Value + 'static, set: impl Fn(Value) + 'static) -> ValueRef {
        ValueRef::Accessor {
            get: Rc::new(get),
            set: Rc::new(set),
        }
    }

    /// Reference to component `axis` of this reference, read and written as
    /// a scalar.
    pub fn component(self, axis: usize) -> ValueRef {
        ValueRef::Component {
            inner: Box::new(self),
            axis,
        }
    }

    /// Read the current value.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range array index, a missing map key or an axis
    /// the inner value does not have.
    pub fn read(&self) -> Value {
        match self {
            ValueRef::Cell(cell) => *cell.borrow(),
            ValueRef::ArrayIndex { array, index } => {
                let array = array.borrow();
                match array.get(*index) {
                    Some(v) => *v,
                    None => panic!(
                        "ValueRef: index {index} out of range for array of length {}",
                        array.len()
                    ),
                }
            }
            ValueRef::MapKey { map, key } => match map.borrow().get(key) {
                Some(v) => *v,
                None => panic!("ValueRef: key '{key}' not present in map"),
            },
            ValueRef::Accessor { get, .. } => get(),
            ValueRef::Component { inner, axis } => Value::Scalar(inner.read().component(*axis)),
        }
    }

    /// Overwrite the referenced value. Missing map keys are inserted.
    pub fn write(&self, value: Value) {
        match self {
            ValueRef::Cell(cell) => *cell.borrow_mut() = value,
            ValueRef::ArrayIndex { array, index } => {
                let mut array = array.borrow_mut();
                let len = array.len();
                match array.get_mut(*index) {
                    Some(slot) => *slot = value,
                    None => panic!("ValueRef: index {index} out of range for array of length {len}"),
                }
            }
            ValueRef::MapKey { map, key } => {
                map.borrow_mut().insert(key.clone(), value);
            }
            ValueRef::Accessor { set, .. } => set(value),
            ValueRef::Component { inner, axis } => {
                let Value::Scalar(x) = value else {
                    panic!("ValueRef: component reference expects a scalar, got {value:?}");
                };
                let current = inner.read();
                inner.write(current.with_component(*axis, x));
            }
        }
    }
}

impl fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Cell(cell) => f.debug_tuple("Cell").field(&*cell.borrow()).finish(),
            ValueRef::ArrayIndex { index, .. } => {
                f.debug_struct("ArrayIndex").field("index", index).finish()
            }
            ValueRef::MapKey { key, .. } => f.debug_struct("MapKey").field("key", key).finish(),
            ValueRef::Accessor { .. } => f.write_str("Accessor"),
            ValueRef::Component { inner, axis } => f
                .debug_struct("Component")
                .field("inner", inner)
                .field("axis", axis)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_is_componentwise() {
        let a = Value::Vec3([0.0, 10.0, -4.0]);
        let b = Value::Vec3([2.0, 20.0, 4.0]);
        assert_eq!(a.lerp(&b, 0.5), Value::Vec3([1.0, 15.0, 0.0]));
        assert_eq!(Value::Scalar(1.0).lerp(&Value::Scalar(3.0), 0.25), Value::Scalar(1.5));
    }

    #[test]
    #[should_panic(expected = "cannot combine")]
    fn lerp_mixed_shapes_panics() {
        Value::Scalar(0.0).lerp(&Value::Vec2([1.0, 1.0]), 0.5);
    }

    #[test]
    fn cell_read_write() {
        let (r, cell) = ValueRef::new_cell(1.0);
        r.write(Value::Scalar(4.0));
        assert_eq!(*cell.borrow(), Value::Scalar(4.0));
        assert_eq!(r.read(), Value::Scalar(4.0));
    }

    #[test]
    fn array_and_map_cells() {
        let array: SharedArray = Rc::new(RefCell::new(vec![Value::Scalar(0.0); 3]));
        let r = ValueRef::array_index(&array, 2);
        r.write(Value::Scalar(9.0));
        assert_eq!(array.borrow()[2], Value::Scalar(9.0));

        let map: SharedMap = Rc::new(RefCell::new(FxHashMap::default()));
        let m = ValueRef::map_key(&map, "hp");
        m.write(Value::Scalar(3.0));
        assert_eq!(m.read(), Value::Scalar(3.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn array_index_out_of_range_panics() {
        let array: SharedArray = Rc::new(RefCell::new(Vec::new()));
        ValueRef::array_index(&array, 0).read();
    }

    #[test]
    #[should_panic(expected = "not present")]
    fn missing_map_key_panics_on_read() {
        let map: SharedMap = Rc::new(RefCell::new(FxHashMap::default()));
        ValueRef::map_key(&map, "missing").read();
    }

    #[test]
    fn accessor_routes_through_closures() {
        let store = Rc::new(RefCell::new(2.0));
        let (g, s) = (Rc::clone(&store), Rc::clone(&store));
        let r = ValueRef::accessor(
            move || Value::Scalar(*g.borrow()),
            move |v| *s.borrow_mut() = v.as_scalar().unwrap_or_default(),
        );
        r.write(Value::Scalar(5.5));
        assert_eq!(*store.borrow(), 5.5);
        assert_eq!(r.read(), Value::Scalar(5.5));
    }

    #[test]
    fn component_reference_writes_single_axis() {
        let (r, cell) = ValueRef::new_cell([1.0, 2.0]);
        let y = r.component(1);
        assert_eq!(y.read(), Value::Scalar(2.0));
        y.write(Value::Scalar(7.0));
        assert_eq!(*cell.borrow(), Value::Vec2([1.0, 7.0]));
    }
}
