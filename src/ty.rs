//! Declared argument types and their bridge to Rust types.

use std::path::PathBuf;

use crate::Value;

/// The type a field declares, before classification.
///
/// `Option<T>` declares `Union([T, Unit])` and `Vec<T>` declares `List(T)`, so
/// the shapes the classifier has to recognize come straight out of the Rust
/// type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Bool,
    Int,
    Float,
    Str,
    Enum(EnumType),
    List(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    /// The "nothing" alternative of an optional type.
    Unit,
    /// A type the classifier knows nothing about.
    Named(String),
}

impl TypeExpr {
    pub fn optional(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Union(vec![inner, TypeExpr::Unit])
    }

    pub fn list(elem: TypeExpr) -> TypeExpr {
        TypeExpr::List(Box::new(elem))
    }
}

/// A closed, named set of symbolic values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: &str, members: I) -> EnumType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumType { name: name.to_string(), members: members.into_iter().map(Into::into).collect() }
    }
}

/// A value that does not fit the Rust type it is converted into.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub expected: String,
    pub found: Value,
}

impl Mismatch {
    pub fn new(expected: impl Into<String>, found: Value) -> Mismatch {
        Mismatch { expected: expected.into(), found }
    }
}

/// Rust types that can back a command field.
///
/// `#[derive(Choice)]` implements this for unit-only enums.
pub trait ArgType: Sized {
    fn type_expr() -> TypeExpr;
    fn from_value(value: Value) -> Result<Self, Mismatch>;
    fn into_value(self) -> Value;
}

macro_rules! int_arg_type {
    ($($ty:ty),*) => {$(
        impl ArgType for $ty {
            fn type_expr() -> TypeExpr {
                TypeExpr::Int
            }
            fn from_value(value: Value) -> Result<Self, Mismatch> {
                match value {
                    Value::Int(it) => {
                        <$ty>::try_from(it).map_err(|_| Mismatch::new(stringify!($ty), Value::Int(it)))
                    }
                    other => Err(Mismatch::new(stringify!($ty), other)),
                }
            }
            fn into_value(self) -> Value {
                match i64::try_from(self) {
                    Ok(it) => Value::Int(it),
                    Err(_) => Value::Text(self.to_string()),
                }
            }
        }
    )*};
}

int_arg_type!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ArgType for f64 {
    fn type_expr() -> TypeExpr {
        TypeExpr::Float
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Float(it) => Ok(it),
            Value::Int(it) => Ok(it as f64),
            other => Err(Mismatch::new("f64", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ArgType for f32 {
    fn type_expr() -> TypeExpr {
        TypeExpr::Float
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Float(it) => Ok(it as f32),
            Value::Int(it) => Ok(it as f32),
            other => Err(Mismatch::new("f32", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::Float(self.into())
    }
}

impl ArgType for bool {
    fn type_expr() -> TypeExpr {
        TypeExpr::Bool
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Bool(it) => Ok(it),
            other => Err(Mismatch::new("bool", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ArgType for String {
    fn type_expr() -> TypeExpr {
        TypeExpr::Str
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Text(it) | Value::Member(it) => Ok(it),
            other => Err(Mismatch::new("String", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl ArgType for PathBuf {
    fn type_expr() -> TypeExpr {
        TypeExpr::Str
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Text(it) => Ok(PathBuf::from(it)),
            other => Err(Mismatch::new("PathBuf", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::Text(self.to_string_lossy().into_owned())
    }
}

impl<T: ArgType> ArgType for Option<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::optional(T::type_expr())
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Absent => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
    fn into_value(self) -> Value {
        self.map_or(Value::Absent, T::into_value)
    }
}

impl<T: ArgType> ArgType for Vec<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }
    fn from_value(value: Value) -> Result<Self, Mismatch> {
        match value {
            Value::Absent => Ok(Vec::new()),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(Mismatch::new("a list", other)),
        }
    }
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(T::into_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_and_vec_declare_their_shape() {
        assert_eq!(
            <Option<Vec<u32>>>::type_expr(),
            TypeExpr::optional(TypeExpr::list(TypeExpr::Int))
        );
        assert_eq!(<Vec<String>>::from_value(Value::Absent), Ok(Vec::new()));
        assert_eq!(<Option<Vec<String>>>::from_value(Value::Absent), Ok(None));
    }

    #[test]
    fn narrowing_integers_reports_mismatch() {
        let err = u8::from_value(Value::Int(300)).unwrap_err();
        assert_eq!(err, Mismatch::new("u8", Value::Int(300)));
        assert_eq!(i16::from_value(Value::Int(-3)), Ok(-3));
    }

    #[test]
    fn wide_integers_never_wrap() {
        assert_eq!(u64::MAX.into_value(), Value::Text("18446744073709551615".into()));
        assert_eq!((i64::MAX as u64).into_value(), Value::Int(i64::MAX));
        assert!(u64::from_value(u64::MAX.into_value()).is_err());
    }
}
