/// Build a [`QueryKey`](crate::domain::query::QueryKey) from primitive parts.
///
/// Usage: `query_key!["holding", user_id, &symbol]`
#[macro_export]
macro_rules! query_key {
    () => {
        $crate::domain::query::QueryKey::default()
    };
    ( $( $part:expr ),+ $(,)? ) => {
        $crate::domain::query::QueryKey::new(vec![
            $( $crate::domain::query::KeyPart::from($part) ),+
        ])
    };
}
