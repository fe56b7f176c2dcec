/// Constructs a [`Value`](crate::Value) using JSON-like syntax.
///
/// Elements and object values must be single token trees, so negative
/// numbers and other compound expressions go into parentheses.
///
/// ```rust
/// # use juniper_dynamic::{graphql_value, Value};
/// let v: Value = graphql_value!({"actor": {"name": "Boguś Linda", "age": (-1)}, "tags": [1, null]});
/// # let _ = v;
/// ```
#[macro_export]
macro_rules! graphql_value {
    (null) => {
        $crate::Value::null()
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::list(vec![$( $crate::graphql_value!($elem) ),*])
    };

    ({}) => {
        $crate::Value::object($crate::Object::default())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {
        $crate::Value::object(
            [$( ($key, $crate::graphql_value!($value)) ),*]
                .into_iter()
                .collect::<$crate::Object>(),
        )
    };

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Object, Value};

    #[test]
    fn scalars() {
        assert_eq!(graphql_value!(123), Value::scalar(123));
        assert_eq!(graphql_value!("test"), Value::scalar("test"));
        assert_eq!(graphql_value!(false), Value::scalar(false));
        assert_eq!(graphql_value!((-2.5)), Value::scalar(-2.5));
        assert_eq!(graphql_value!(null), Value::null());
    }

    #[test]
    fn option() {
        assert_eq!(graphql_value!(Some("test")), Value::scalar("test"));
        assert_eq!(graphql_value!((None::<i32>)), Value::null());
    }

    #[test]
    fn nested() {
        let value = graphql_value!({"key": [1, {"inner": null}], "other": "x"});

        let inner: Object = [("inner", Value::null())].into_iter().collect();
        let expected: Object = [
            (
                "key",
                Value::list(vec![Value::scalar(1), Value::object(inner)]),
            ),
            ("other", Value::scalar("x")),
        ]
        .into_iter()
        .collect();

        assert_eq!(value, Value::object(expected));
    }

    #[test]
    fn empty() {
        assert_eq!(graphql_value!([]), Value::list(vec![]));
        assert_eq!(graphql_value!({}), Value::object(Object::default()));
    }
}
