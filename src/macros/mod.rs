// backend_common/src/macros/mod.rs
//
// Declarative helper macros

/// Build a `FieldMap` inline
///
/// Values may be anything that implements `serde::Serialize`.
///
/// # Examples
///
/// ```
/// use backend_common::fields;
///
/// let fields = fields! {
///     "order_id" => 1042,
///     "currency" => "EUR",
///     "retry" => false
/// };
/// assert_eq!(fields.len(), 3);
///
/// let empty = fields! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    {} => {
        $crate::types::FieldMap::new()
    };

    {
        $($key:expr => $value:expr),* $(,)?
    } => {
        {
            let mut map = $crate::types::FieldMap::new();
            $(
                map.insert($key, $value);
            )*
            map
        }
    };
}
