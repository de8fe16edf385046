//! Declarative record layouts
//!
//! Record kinds are declared as field lists; the macros below generate the
//! struct, its decoder, encoder and size calculation from one description so
//! the three can never disagree.
//!
//! Field kinds accepted by [`blf_record!`]:
//! - `name: Type,`: any [`Wire`](crate::records::wire::Wire) type
//! - `name: len(Type => payload),`: length prefix, derived from `payload`
//!   when encoding and not stored in the struct
//! - `name: bytes(len_field),`: `Vec<u8>` sized by an earlier `len` field
//! - `name: wide(len_field),`: `Vec<u16>` (UTF-16 units) sized the same way
//! - `name: rest,`: `Vec<u8>` taking every body byte not claimed by the
//!   fixed-width fields (only for layouts without `bytes`/`wide` payloads)
//!
//! Every record also gets a `header` field. Layouts without a `rest` payload
//! get a `trailing` field as well, keeping whatever follows the known fields
//! up to `objectSize`; in `rest` layouts those bytes belong to the payload.

/// A plain fixed-width structure nested inside records
macro_rules! blf_struct {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl $crate::records::wire::Wire for $name {
            const SIZE: usize = 0 $(+ <$ty as $crate::records::wire::Wire>::SIZE)*;

            fn zeroed() -> Self {
                Self {
                    $($field: <$ty as $crate::records::wire::Wire>::zeroed(),)*
                }
            }

            fn read_from(
                reader: &mut $crate::records::wire::ByteReader<'_>,
            ) -> $crate::types::Result<Self> {
                Ok(Self {
                    $($field: <$ty as $crate::records::wire::Wire>::read_from(reader)?,)*
                })
            }

            fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
                $(<$ty as $crate::records::wire::Wire>::write_to(&self.$field, writer)?;)*
                Ok(())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as $crate::records::wire::Wire>::zeroed()
            }
        }
    };
}

/// A complete record body; see the module documentation for field kinds
macro_rules! blf_record {
    // length prefix
    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:tt)*]
        body [$(#[$fm:meta])* $f:ident : len($t:ty => $target:ident), $($rest:tt)*]
    ) => {
        blf_record!(@munch [$($meta)*] $name [$r $w $s]
            fields [$($fields)*]
            read [$($read)*
                let $f = <$t as $crate::records::wire::Wire>::read_from($r)?;]
            write [$($write)*
                <$t as $crate::records::wire::Wire>::write_to(
                    &$crate::records::wire::length_field::<$t>($s.$target.len(), stringify!($f))?,
                    $w,
                )?;]
            size [$($size)* + <$t as $crate::records::wire::Wire>::SIZE]
            fixed [$($fixed)* + <$t as $crate::records::wire::Wire>::SIZE]
            init [$($init)*]
            default [$($default)*]
            trail [$($trail)*]
            body [$($rest)*]
        );
    };

    // byte payload
    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:tt)*]
        body [$(#[$fm:meta])* $f:ident : bytes($len:ident), $($rest:tt)*]
    ) => {
        blf_record!(@munch [$($meta)*] $name [$r $w $s]
            fields [$($fields)* $(#[$fm])* pub $f: Vec<u8>,]
            read [$($read)* let $f = $r.take_vec($len as usize)?;]
            write [$($write)* $w.write_all(&$s.$f)?;]
            size [$($size)* + $s.$f.len()]
            fixed [$($fixed)*]
            init [$($init)* $f,]
            default [$($default)* $f: Vec::new(),]
            trail [$($trail)*]
            body [$($rest)*]
        );
    };

    // UTF-16 payload
    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:tt)*]
        body [$(#[$fm:meta])* $f:ident : wide($len:ident), $($rest:tt)*]
    ) => {
        blf_record!(@munch [$($meta)*] $name [$r $w $s]
            fields [$($fields)* $(#[$fm])* pub $f: Vec<u16>,]
            read [$($read)* let $f = $r.take_wide($len as usize)?;]
            write [$($write)* $crate::records::wire::write_wide($w, &$s.$f)?;]
            size [$($size)* + 2 * $s.$f.len()]
            fixed [$($fixed)*]
            init [$($init)* $f,]
            default [$($default)* $f: Vec::new(),]
            trail [$($trail)*]
            body [$($rest)*]
        );
    };

    // everything not claimed by fixed fields
    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:tt)*]
        body [$(#[$fm:meta])* $f:ident : rest, $($rest:tt)*]
    ) => {
        blf_record!(@munch [$($meta)*] $name [$r $w $s]
            fields [$($fields)* $(#[$fm])* pub $f: Vec<u8>,]
            read [$($read)*
                let $f = {
                    let len = $r.total().saturating_sub(Self::FIXED_SIZE);
                    $r.take_vec(len)?
                };]
            write [$($write)* $w.write_all(&$s.$f)?;]
            size [$($size)* + $s.$f.len()]
            fixed [$($fixed)*]
            init [$($init)* $f,]
            default [$($default)* $f: Vec::new(),]
            trail []
            body [$($rest)*]
        );
    };

    // fixed-width field
    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:tt)*]
        body [$(#[$fm:meta])* $f:ident : $t:ty, $($rest:tt)*]
    ) => {
        blf_record!(@munch [$($meta)*] $name [$r $w $s]
            fields [$($fields)* $(#[$fm])* pub $f: $t,]
            read [$($read)* let $f = <$t as $crate::records::wire::Wire>::read_from($r)?;]
            write [$($write)* <$t as $crate::records::wire::Wire>::write_to(&$s.$f, $w)?;]
            size [$($size)* + <$t as $crate::records::wire::Wire>::SIZE]
            fixed [$($fixed)* + <$t as $crate::records::wire::Wire>::SIZE]
            init [$($init)* $f,]
            default [$($default)* $f: <$t as $crate::records::wire::Wire>::zeroed(),]
            trail [$($trail)*]
            body [$($rest)*]
        );
    };

    (@munch [$($meta:tt)*] $name:ident [$r:ident $w:ident $s:ident]
        fields [$($fields:tt)*] read [$($read:tt)*] write [$($write:tt)*]
        size [$($size:tt)*] fixed [$($fixed:tt)*] init [$($init:tt)*] default [$($default:tt)*]
        trail [$($trail:ident)*]
        body []
    ) => {
        $($meta)*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub header: $crate::records::header::ObjectHeader,
            $($fields)*
            $(
                /// Bytes following the known fields, kept verbatim
                pub $trail: Vec<u8>,
            )*
        }

        impl $name {
            #[allow(dead_code)]
            const FIXED_SIZE: usize = 0 $($fixed)*;
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    header: Default::default(),
                    $($default)*
                    $($trail: Vec::new(),)*
                }
            }
        }

        impl $crate::records::wire::RecordBody for $name {
            fn decode_body(
                header: $crate::records::header::ObjectHeader,
                $r: &mut $crate::records::wire::ByteReader<'_>,
            ) -> $crate::types::Result<Self> {
                $($read)*
                $(let $trail = $r.take_rest();)*
                Ok(Self {
                    header,
                    $($init)*
                    $($trail,)*
                })
            }

            fn encode_body<W: std::io::Write>(&$s, $w: &mut W) -> $crate::types::Result<()> {
                $($write)*
                $($w.write_all(&$s.$trail)?;)*
                Ok(())
            }

            fn body_size(&$s) -> usize {
                0 $($size)* $(+ $s.$trail.len())*
            }

            fn header(&$s) -> &$crate::records::header::ObjectHeader {
                &$s.header
            }
        }
    };

    (
        $(#[$meta:meta])*
        $name:ident { $($body:tt)* }
    ) => {
        blf_record!(@munch [$(#[$meta])*] $name [reader writer self]
            fields [] read [] write [] size [] fixed [] init [] default []
            trail [trailing]
            body [$($body)*]
        );
    };
}

/// Several records in one invocation
macro_rules! blf_records {
    ($(
        $(#[$meta:meta])*
        $name:ident { $($body:tt)* }
    )*) => {
        $(
            blf_record! {
                $(#[$meta])*
                $name { $($body)* }
            }
        )*
    };
}
