//! Copies between owned [`Variant`]s and their wire form.
//!
//! Variants are value-typed across the boundary: everything is copied, and
//! no owned variant ever aliases host memory. String buffers travelling
//! *out* of the plugin are allocated with the host allocator so the host's
//! variant teardown can free them; buffers travelling *in* are copied into
//! owned `String`s and left untouched. Inbound string bytes are decoded
//! lossily: the wire carries raw bytes with no UTF-8 guarantee, and an
//! invalid sequence becomes U+FFFD instead of failing the call.

use core::ffi::c_int;

use nativebind_core::{Variant, VariantError, VariantKind};

use crate::abi::{RawString, RawVariant, RawVariantData};
use crate::host::HostApi;

/// Encode an owned variant into its wire form.
///
/// For string variants the payload buffer is host-allocated; pair with
/// [`free_raw`] if the wire value never leaves the plugin's control.
pub fn to_raw(host: &HostApi, variant: &Variant) -> RawVariant {
    let kind: u32 = variant.kind().into();
    let data = match variant {
        Variant::Nil => RawVariantData { int: 0 },
        Variant::Bool(v) => RawVariantData { boolean: *v },
        Variant::Int(v) => RawVariantData { int: *v },
        Variant::Uint(v) => RawVariantData { uint: *v },
        Variant::Float(v) => RawVariantData { float: *v },
        Variant::Str(s) => RawVariantData {
            string: host.alloc_bytes(s.as_bytes()),
        },
        Variant::Vector2(v) => RawVariantData { vector2: *v },
        Variant::Vector3(v) => RawVariantData { vector3: *v },
        Variant::Color(v) => RawVariantData { color: *v },
    };
    RawVariant { kind, data }
}

/// Decode a wire variant into an owned one.
///
/// An unknown tag is [`VariantError::Unrepresentable`] — a binding
/// generation bug, never silently mapped to nil. String payloads are
/// decoded lossily (see the module doc).
///
/// # Safety
///
/// `raw` must be a well-formed wire variant: its payload field named by
/// `raw.kind` must be live, and a string payload must point at `len`
/// readable bytes.
pub unsafe fn from_raw(raw: &RawVariant) -> Result<Variant, VariantError> {
    let kind =
        VariantKind::try_from(raw.kind).map_err(|_| VariantError::Unrepresentable(raw.kind))?;
    Ok(match kind {
        VariantKind::Nil => Variant::Nil,
        VariantKind::Bool => Variant::Bool(unsafe { raw.data.boolean }),
        VariantKind::Int => Variant::Int(unsafe { raw.data.int }),
        VariantKind::Uint => Variant::Uint(unsafe { raw.data.uint }),
        VariantKind::Float => Variant::Float(unsafe { raw.data.float }),
        VariantKind::Str => {
            let RawString { ptr, len } = unsafe { raw.data.string };
            if ptr.is_null() || len == 0 {
                Variant::Str(String::new())
            } else {
                let bytes = unsafe { core::slice::from_raw_parts(ptr, len) };
                Variant::Str(String::from_utf8_lossy(bytes).into_owned())
            }
        }
        VariantKind::Vector2 => Variant::Vector2(unsafe { raw.data.vector2 }),
        VariantKind::Vector3 => Variant::Vector3(unsafe { raw.data.vector3 }),
        VariantKind::Color => Variant::Color(unsafe { raw.data.color }),
    })
}

/// Release the host-allocated payload of a wire variant produced by
/// [`to_raw`].
///
/// # Safety
///
/// `raw` must have been produced by [`to_raw`] with the same host, and must
/// not be used afterwards.
pub unsafe fn free_raw(host: &HostApi, raw: &RawVariant) {
    if raw.kind == u32::from(VariantKind::Str) {
        let string = unsafe { raw.data.string };
        host.free_ptr(string.ptr.cast());
    }
}

/// Normalize the host's argument array into a slice.
///
/// The ABI encodes "no arguments" both as count `0` and as the `-1`
/// sentinel; both become the empty slice here so every later stage sees a
/// single representation.
///
/// # Safety
///
/// When `num_args > 0`, `args` must point at `num_args` well-formed wire
/// variants.
pub unsafe fn args_slice<'a>(args: *const RawVariant, num_args: c_int) -> &'a [RawVariant] {
    if args.is_null() || num_args <= 0 {
        return &[];
    }
    unsafe { core::slice::from_raw_parts(args, num_args as usize) }
}

/// Decode a normalized argument array into owned variants.
///
/// # Safety
///
/// Same requirements as [`args_slice`] and [`from_raw`].
pub unsafe fn collect_args(
    args: *const RawVariant,
    num_args: c_int,
) -> Result<Vec<Variant>, VariantError> {
    unsafe { args_slice(args, num_args) }
        .iter()
        .map(|raw| unsafe { from_raw(raw) })
        .collect()
}
