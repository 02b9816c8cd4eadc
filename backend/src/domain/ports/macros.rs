//! `define_port_error!` declares a storage port's error enum.
//!
//! Every variant carries the adapter's `message`. The macro emits the
//! `thiserror` enum, a snake_case constructor per variant
//! (`ProductRepositoryError::query("...")`), a `message()` accessor, and the
//! conversion into a `storage_unavailable` [`DomainError`] that sessions send
//! back to the writer.
//!
//! [`DomainError`]: crate::domain::DomainError

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $display:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Adapter-supplied detail, without the variant prefix.
            pub fn message(&self) -> &str {
                match self {
                    $(Self::$variant { message })|* => message.as_str(),
                }
            }
        }

        impl From<$name> for $crate::domain::DomainError {
            fn from(value: $name) -> Self {
                $crate::domain::DomainError::storage_unavailable(value.to_string())
            }
        }
    };
}

pub(crate) use define_port_error;
