//! # Codec Runtime
//!
//! The shared encode/decode/structural-conversion walkers behind every
//! [`TypeHandle`](crate::namespace::TypeHandle). One algorithm per direction,
//! driven by the modifier stacks and arena ids baked into the namespace.
//!
//! ## Modifier Semantics
//!
//! Applied outermost first:
//!
//! - `Optional`: one presence byte (`0x00` absent, `0x01` present; anything
//!   else is a decode error), then the inner encoding when present.
//! - `Extension`: no marker; the field is present iff bytes remain. Null
//!   encodes to nothing.
//! - `Array`: varuint element count, then the inner encodings concatenated.
//!   An array of optionals decodes each element as an independent optional.
//!
//! ## Variant Values
//!
//! On the wire a variant is `varuint(tag) + payload`, tag being the arm's
//! declared position. In value form, struct arms carry a `"variant_type"`
//! entry holding the arm's declared type name; non-struct arms use the
//! two-element `[declared, payload]` pair so decode output re-encodes to the
//! same arm even when several arms would accept the payload. Untagged values
//! are matched by trying each arm's conversion in declared order.

use tessera_scalars::{put_varuint32, AbiValue, ByteCursor};

use crate::error::{ConvertError, DecodeError, EncodeError};
use crate::namespace::{NamespaceInner, TypeEntry, TypeId, VariantType};
use crate::resolve::Modifier;

/// Key of the self-describing tag entry in structural variant maps.
pub const VARIANT_TAG: &str = "variant_type";

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

impl NamespaceInner {
    pub(crate) fn encode_id(
        &self,
        id: TypeId,
        value: &AbiValue,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        let site = self.arena[id].name().to_owned();
        self.encode_leaf(&site, id, value, out)
    }

    fn encode_leaf(
        &self,
        site: &str,
        id: TypeId,
        value: &AbiValue,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        match &self.arena[id] {
            TypeEntry::Alias(a) => self.encode_modified(site, &a.modifiers, a.leaf, value, out),
            _ if value.is_null() => Err(EncodeError::UnexpectedNull {
                site: site.to_owned(),
            }),
            TypeEntry::Scalar(s) => s.encode(value, out).map_err(|source| EncodeError::Scalar {
                site: site.to_owned(),
                source,
            }),
            TypeEntry::Struct(st) => {
                if value.as_map().is_none() {
                    return Err(EncodeError::ExpectedMap {
                        site: site.to_owned(),
                        got: value.kind(),
                    });
                }
                for field in &st.pipeline {
                    let field_site = format!("{}.{}", st.name, field.name);
                    let field_value = value.get(&field.name).unwrap_or(&AbiValue::Null);
                    self.encode_modified(&field_site, &field.modifiers, field.leaf, field_value, out)?;
                }
                Ok(())
            }
            TypeEntry::Variant(v) => self.encode_variant(v, value, out),
        }
    }

    pub(crate) fn encode_modified(
        &self,
        site: &str,
        modifiers: &[Modifier],
        leaf: TypeId,
        value: &AbiValue,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        match modifiers.split_first() {
            None => self.encode_leaf(site, leaf, value, out),
            Some((Modifier::Optional, rest)) => {
                if value.is_null() {
                    out.push(0);
                    Ok(())
                } else {
                    out.push(1);
                    self.encode_modified(site, rest, leaf, value, out)
                }
            }
            Some((Modifier::Extension, rest)) => {
                if value.is_null() {
                    Ok(())
                } else {
                    self.encode_modified(site, rest, leaf, value, out)
                }
            }
            Some((Modifier::Array, rest)) => {
                let items = value.as_list().ok_or_else(|| EncodeError::ExpectedList {
                    site: site.to_owned(),
                    got: value.kind(),
                })?;
                put_varuint32(out, items.len() as u32);
                for item in items {
                    self.encode_modified(site, rest, leaf, item, out)?;
                }
                Ok(())
            }
        }
    }

    fn encode_variant(
        &self,
        v: &VariantType,
        value: &AbiValue,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        match explicit_arm(v, value) {
            Err(arm) => Err(EncodeError::UnknownArm {
                site: v.name.clone(),
                arm,
            }),
            Ok(Some((index, payload))) => {
                put_varuint32(out, index as u32);
                let arm = &v.arms[index];
                let site = format!("{}.{}", v.name, arm.declared);
                self.encode_modified(&site, &arm.modifiers, arm.leaf, &payload, out)
            }
            Ok(None) => {
                // untagged: first arm whose conversion accepts the value wins
                for (index, arm) in v.arms.iter().enumerate() {
                    let site = format!("{}.{}", v.name, arm.declared);
                    let Ok(canonical) =
                        self.from_structural_modified(&site, &arm.modifiers, arm.leaf, value)
                    else {
                        continue;
                    };
                    put_varuint32(out, index as u32);
                    return self.encode_modified(&site, &arm.modifiers, arm.leaf, &canonical, out);
                }
                Err(EncodeError::NoMatchingArm {
                    site: v.name.clone(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

impl NamespaceInner {
    pub(crate) fn decode_id(
        &self,
        id: TypeId,
        cur: &mut ByteCursor<'_>,
    ) -> Result<AbiValue, DecodeError> {
        let site = self.arena[id].name().to_owned();
        self.decode_leaf(&site, id, cur)
    }

    fn decode_leaf(
        &self,
        site: &str,
        id: TypeId,
        cur: &mut ByteCursor<'_>,
    ) -> Result<AbiValue, DecodeError> {
        match &self.arena[id] {
            TypeEntry::Scalar(s) => s.decode(cur).map_err(|source| DecodeError::Scalar {
                site: site.to_owned(),
                source,
            }),
            TypeEntry::Struct(st) => {
                let mut entries = Vec::with_capacity(st.pipeline.len());
                for field in &st.pipeline {
                    let field_site = format!("{}.{}", st.name, field.name);
                    let value =
                        self.decode_modified(&field_site, &field.modifiers, field.leaf, cur)?;
                    entries.push((field.name.clone(), value));
                }
                Ok(AbiValue::Map(entries))
            }
            TypeEntry::Variant(v) => self.decode_variant(v, cur),
            TypeEntry::Alias(a) => self.decode_modified(site, &a.modifiers, a.leaf, cur),
        }
    }

    pub(crate) fn decode_modified(
        &self,
        site: &str,
        modifiers: &[Modifier],
        leaf: TypeId,
        cur: &mut ByteCursor<'_>,
    ) -> Result<AbiValue, DecodeError> {
        match modifiers.split_first() {
            None => self.decode_leaf(site, leaf, cur),
            Some((Modifier::Optional, rest)) => {
                let byte = cur.read_u8().map_err(|source| DecodeError::Scalar {
                    site: site.to_owned(),
                    source,
                })?;
                match byte {
                    0 => Ok(AbiValue::Null),
                    1 => self.decode_modified(site, rest, leaf, cur),
                    other => Err(DecodeError::BadPresenceByte {
                        site: site.to_owned(),
                        byte: other,
                    }),
                }
            }
            Some((Modifier::Extension, rest)) => {
                if cur.is_empty() {
                    Ok(AbiValue::Null)
                } else {
                    self.decode_modified(site, rest, leaf, cur)
                }
            }
            Some((Modifier::Array, rest)) => {
                let count = cur.read_varuint32().map_err(|source| DecodeError::Scalar {
                    site: site.to_owned(),
                    source,
                })?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.decode_modified(site, rest, leaf, cur)?);
                }
                Ok(AbiValue::List(items))
            }
        }
    }

    fn decode_variant(
        &self,
        v: &VariantType,
        cur: &mut ByteCursor<'_>,
    ) -> Result<AbiValue, DecodeError> {
        let tag = cur.read_varuint32().map_err(|source| DecodeError::Scalar {
            site: v.name.clone(),
            source,
        })?;
        let Some(arm) = v.arms.get(tag as usize) else {
            return Err(DecodeError::TagOutOfRange {
                site: v.name.clone(),
                tag,
                arms: v.arms.len(),
            });
        };
        let site = format!("{}.{}", v.name, arm.declared);
        let payload = self.decode_modified(&site, &arm.modifiers, arm.leaf, cur)?;
        Ok(tag_payload(arm.is_struct && arm.modifiers.is_empty(), &arm.declared, payload))
    }
}

// ---------------------------------------------------------------------------
// structural conversion
// ---------------------------------------------------------------------------

impl NamespaceInner {
    pub(crate) fn to_structural_id(
        &self,
        id: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        let site = self.arena[id].name().to_owned();
        self.to_structural_leaf(&site, id, value)
    }

    fn to_structural_leaf(
        &self,
        site: &str,
        id: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        match &self.arena[id] {
            TypeEntry::Alias(a) => self.to_structural_modified(site, &a.modifiers, a.leaf, value),
            _ if value.is_null() => Err(ConvertError::UnexpectedNull {
                site: site.to_owned(),
            }),
            TypeEntry::Scalar(s) => {
                s.to_structural(value).map_err(|source| ConvertError::Scalar {
                    site: site.to_owned(),
                    source,
                })
            }
            TypeEntry::Struct(st) => {
                if value.as_map().is_none() {
                    return Err(ConvertError::ExpectedMap {
                        site: site.to_owned(),
                        got: value.kind(),
                    });
                }
                let mut entries = Vec::with_capacity(st.pipeline.len());
                for field in &st.pipeline {
                    let field_site = format!("{}.{}", st.name, field.name);
                    let field_value = value.get(&field.name).unwrap_or(&AbiValue::Null);
                    let converted = self.to_structural_modified(
                        &field_site,
                        &field.modifiers,
                        field.leaf,
                        field_value,
                    )?;
                    entries.push((field.name.clone(), converted));
                }
                Ok(AbiValue::Map(entries))
            }
            TypeEntry::Variant(v) => self.convert_variant(v, value, Direction::ToStructural),
        }
    }

    pub(crate) fn to_structural_modified(
        &self,
        site: &str,
        modifiers: &[Modifier],
        leaf: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        self.convert_modified(site, modifiers, leaf, value, Direction::ToStructural)
    }

    pub(crate) fn from_structural_id(
        &self,
        id: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        let site = self.arena[id].name().to_owned();
        self.from_structural_leaf(&site, id, value)
    }

    fn from_structural_leaf(
        &self,
        site: &str,
        id: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        match &self.arena[id] {
            TypeEntry::Alias(a) => self.from_structural_modified(site, &a.modifiers, a.leaf, value),
            _ if value.is_null() => Err(ConvertError::UnexpectedNull {
                site: site.to_owned(),
            }),
            TypeEntry::Scalar(s) => {
                s.from_structural(value).map_err(|source| ConvertError::Scalar {
                    site: site.to_owned(),
                    source,
                })
            }
            TypeEntry::Struct(st) => {
                if value.as_map().is_none() {
                    return Err(ConvertError::ExpectedMap {
                        site: site.to_owned(),
                        got: value.kind(),
                    });
                }
                let mut entries = Vec::with_capacity(st.pipeline.len());
                for field in &st.pipeline {
                    let field_site = format!("{}.{}", st.name, field.name);
                    let field_value = value.get(&field.name).unwrap_or(&AbiValue::Null);
                    let converted = self.from_structural_modified(
                        &field_site,
                        &field.modifiers,
                        field.leaf,
                        field_value,
                    )?;
                    entries.push((field.name.clone(), converted));
                }
                Ok(AbiValue::Map(entries))
            }
            TypeEntry::Variant(v) => self.convert_variant(v, value, Direction::FromStructural),
        }
    }

    pub(crate) fn from_structural_modified(
        &self,
        site: &str,
        modifiers: &[Modifier],
        leaf: TypeId,
        value: &AbiValue,
    ) -> Result<AbiValue, ConvertError> {
        self.convert_modified(site, modifiers, leaf, value, Direction::FromStructural)
    }

    fn convert_modified(
        &self,
        site: &str,
        modifiers: &[Modifier],
        leaf: TypeId,
        value: &AbiValue,
        direction: Direction,
    ) -> Result<AbiValue, ConvertError> {
        match modifiers.split_first() {
            None => match direction {
                Direction::ToStructural => self.to_structural_leaf(site, leaf, value),
                Direction::FromStructural => self.from_structural_leaf(site, leaf, value),
            },
            Some((Modifier::Optional | Modifier::Extension, rest)) => {
                if value.is_null() {
                    Ok(AbiValue::Null)
                } else {
                    self.convert_modified(site, rest, leaf, value, direction)
                }
            }
            Some((Modifier::Array, rest)) => {
                let items = value.as_list().ok_or_else(|| ConvertError::ExpectedList {
                    site: site.to_owned(),
                    got: value.kind(),
                })?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.convert_modified(site, rest, leaf, item, direction)?);
                }
                Ok(AbiValue::List(out))
            }
        }
    }

    fn convert_variant(
        &self,
        v: &VariantType,
        value: &AbiValue,
        direction: Direction,
    ) -> Result<AbiValue, ConvertError> {
        match explicit_arm(v, value) {
            Err(arm) => Err(ConvertError::UnknownArm {
                site: v.name.clone(),
                arm,
            }),
            Ok(Some((index, payload))) => {
                let arm = &v.arms[index];
                let site = format!("{}.{}", v.name, arm.declared);
                let converted =
                    self.convert_modified(&site, &arm.modifiers, arm.leaf, &payload, direction)?;
                Ok(tag_payload(
                    arm.is_struct && arm.modifiers.is_empty(),
                    &arm.declared,
                    converted,
                ))
            }
            Ok(None) => {
                for arm in &v.arms {
                    let site = format!("{}.{}", v.name, arm.declared);
                    let Ok(converted) =
                        self.convert_modified(&site, &arm.modifiers, arm.leaf, value, direction)
                    else {
                        continue;
                    };
                    return Ok(tag_payload(
                        arm.is_struct && arm.modifiers.is_empty(),
                        &arm.declared,
                        converted,
                    ));
                }
                Err(ConvertError::NoMatchingArm {
                    site: v.name.clone(),
                })
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    ToStructural,
    FromStructural,
}

/// Find the arm a value explicitly names, if it names one.
///
/// Recognizes the tagged-map form (struct arms) and the `[declared, payload]`
/// pair form. `Err` carries an unknown tag from a tagged map; pair forms
/// whose first element matches no arm fall through to untagged matching,
/// since a two-element list may be a legitimate payload in its own right.
fn explicit_arm(v: &VariantType, value: &AbiValue) -> Result<Option<(usize, AbiValue)>, String> {
    match value {
        AbiValue::Map(entries) => {
            let Some(AbiValue::String(tag)) = value.get(VARIANT_TAG) else {
                return Ok(None);
            };
            let index = v
                .arms
                .iter()
                .position(|a| &a.declared == tag)
                .ok_or_else(|| tag.clone())?;
            let payload = AbiValue::Map(
                entries
                    .iter()
                    .filter(|(k, _)| k != VARIANT_TAG)
                    .cloned()
                    .collect(),
            );
            Ok(Some((index, payload)))
        }
        AbiValue::List(items) if items.len() == 2 => {
            if let AbiValue::String(tag) = &items[0] {
                if let Some(index) = v.arms.iter().position(|a| &a.declared == tag) {
                    return Ok(Some((index, items[1].clone())));
                }
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Re-attach the self-describing tag to a converted or decoded arm payload.
fn tag_payload(tag_in_map: bool, declared: &str, payload: AbiValue) -> AbiValue {
    if tag_in_map {
        if let AbiValue::Map(mut entries) = payload {
            entries.insert(0, (VARIANT_TAG.to_owned(), AbiValue::String(declared.to_owned())));
            return AbiValue::Map(entries);
        }
        payload
    } else {
        AbiValue::List(vec![AbiValue::String(declared.to_owned()), payload])
    }
}
