//! Macro generating port error enums with snake-case constructors.
//!
//! Every variant carries named fields. Each gets a constructor taking
//! `impl Into<FieldType>` per field, so adapters can write
//! `DonorStoreError::query(err.to_string())` or pass a `&str` directly.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Construct [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        /// Failures of a hypothetical roster export.
        pub enum RosterExportError {
            Unreachable { message: String } => "export target unreachable: {message}",
            TooLarge { rows: u64, limit: u64 } => "export of {rows} rows exceeds {limit}",
        }
    }

    #[rstest]
    fn string_fields_accept_borrowed_text() {
        let err = RosterExportError::unreachable("connection refused");
        assert_eq!(err.to_string(), "export target unreachable: connection refused");
        assert_eq!(
            err,
            RosterExportError::Unreachable {
                message: "connection refused".to_owned()
            }
        );
    }

    #[rstest]
    fn multi_field_variants_keep_argument_order() {
        let err = RosterExportError::too_large(250_u64, 100_u64);
        assert_eq!(err.to_string(), "export of 250 rows exceeds 100");
    }
}
