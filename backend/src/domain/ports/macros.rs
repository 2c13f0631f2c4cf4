//! Helper macro for the error enums of the domain ports.
//!
//! `define_port_error!` expands one declaration into a `thiserror` enum plus
//! a snake-case constructor per variant, so adapters can write
//! `MarketRepositoryError::conflict("markets_code_key")` instead of spelling
//! out struct variants. String fields accept anything `Into<String>`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SampleStoreError {
            Offline => "store is offline",
            Rejected { constraint: String } => "write rejected by {constraint}",
            Slow { table: String, millis: u64 } => "{table} answered after {millis}ms",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SampleStoreError::offline(), SampleStoreError::Offline);
        assert_eq!(SampleStoreError::offline().to_string(), "store is offline");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = SampleStoreError::rejected("markets_code_key");
        assert_eq!(err.to_string(), "write rejected by markets_code_key");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SampleStoreError::slow("market_sub_groups", 250_u64);
        assert_eq!(err.to_string(), "market_sub_groups answered after 250ms");
    }
}
