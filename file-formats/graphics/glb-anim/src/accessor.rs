//! Typed accessor decoding
//!
//! Only tightly packed little-endian float32 data is supported. Accessors
//! declaring another component type are still decoded as float32 after a
//! warning.

use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec3};
use log::trace;

use crate::builder::Diagnostics;
use crate::document::Document;
use crate::error::{GlbError, ParseWarning, Result};

/// Size of one float32 component
pub const COMPONENT_SIZE: usize = 4;

/// Decoded accessor contents: flat components plus the element width
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorData {
    components: Vec<f32>,
    width: usize,
}

impl AccessorData {
    /// Number of elements
    pub fn len(&self) -> usize {
        self.components.len() / self.width
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components per element
    pub fn width(&self) -> usize {
        self.width
    }

    /// All components in order; for scalar accessors this is the value list
    pub fn components(&self) -> &[f32] {
        &self.components
    }

    /// Iterate over elements as fixed-width slices
    pub fn elements(&self) -> impl Iterator<Item = &[f32]> {
        self.components.chunks_exact(self.width)
    }

    /// Keep every `stride`-th element starting at `offset`
    pub fn every_nth(&self, stride: usize, offset: usize) -> Self {
        let components = self
            .elements()
            .skip(offset)
            .step_by(stride.max(1))
            .flatten()
            .copied()
            .collect();
        Self {
            components,
            width: self.width,
        }
    }

    /// Elements as 3D vectors, if the width is 3
    pub fn to_vec3s(&self) -> Option<Vec<Vec3>> {
        (self.width == 3).then(|| self.elements().map(Vec3::from_slice).collect())
    }

    /// Elements as (x, y, z, w) quaternions, if the width is 4
    pub fn to_quats(&self) -> Option<Vec<Quat>> {
        (self.width == 4).then(|| self.elements().map(Quat::from_slice).collect())
    }
}

/// Decode `element_count` elements of `component_count` float32 components.
///
/// Reading starts at `buffer_view_offset + accessor_byte_offset` in `blob`
/// and covers `element_count * component_count * 4` contiguous bytes.
pub fn decode_accessor(
    blob: &[u8],
    buffer_view_offset: usize,
    accessor_byte_offset: usize,
    component_count: usize,
    element_count: usize,
) -> Result<AccessorData> {
    if component_count == 0 {
        return Err(GlbError::ReferenceError(
            "accessor declares zero components per element".to_string(),
        ));
    }

    let offset = buffer_view_offset.saturating_add(accessor_byte_offset);
    let needed = element_count
        .checked_mul(component_count)
        .and_then(|n| n.checked_mul(COMPONENT_SIZE))
        .unwrap_or(usize::MAX);
    let available = blob.len().saturating_sub(offset);

    let bytes = offset
        .checked_add(needed)
        .and_then(|end| blob.get(offset..end))
        .ok_or(GlbError::TruncatedBuffer {
            offset,
            needed,
            available,
        })?;

    let mut components = vec![0.0f32; element_count * component_count];
    LittleEndian::read_f32_into(bytes, &mut components);

    trace!(
        "Decoded {} x {} floats at offset {}",
        element_count, component_count, offset
    );

    Ok(AccessorData {
        components,
        width: component_count,
    })
}

/// Resolves accessors of a document against its binary chunk
pub struct AccessorReader<'a> {
    document: &'a Document,
    blob: &'a [u8],
}

impl<'a> AccessorReader<'a> {
    pub fn new(document: &'a Document, blob: &'a [u8]) -> Self {
        Self { document, blob }
    }

    /// Decode an accessor as scalars
    pub fn read_scalars(&self, index: usize, diagnostics: &mut Diagnostics) -> Result<Vec<f32>> {
        Ok(self.read(index, 1, diagnostics)?.components)
    }

    /// Decode an accessor as keyframe values.
    ///
    /// Width is 3 for `VEC3` accessors and 4 for anything else.
    pub fn read_values(&self, index: usize, diagnostics: &mut Diagnostics) -> Result<AccessorData> {
        let accessor = self.document.accessor(index)?;
        let width = if accessor.accessor_type == "VEC3" { 3 } else { 4 };
        self.read(index, width, diagnostics)
    }

    fn read(
        &self,
        index: usize,
        component_count: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<AccessorData> {
        let accessor = self.document.accessor(index)?;
        if !accessor.is_float() {
            diagnostics.warn(ParseWarning::UnsupportedComponentType {
                accessor: index,
                component_type: accessor.component_type,
            })?;
        }

        let view_index = accessor.buffer_view.ok_or_else(|| {
            GlbError::ReferenceError(format!("accessor {index} has no buffer view"))
        })?;
        let view = self.document.buffer_view(view_index)?;

        decode_accessor(
            self.blob,
            view.byte_offset,
            accessor.byte_offset,
            component_count,
            accessor.count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_scalars() {
        let blob = floats(&[0.0, 0.5, 1.0]);
        let data = decode_accessor(&blob, 0, 0, 1, 3).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.components(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_decode_vec3_with_offsets() {
        let mut blob = vec![0xAA; 6];
        blob.extend(floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        // buffer view at 2, accessor at +4
        let data = decode_accessor(&blob, 2, 4, 3, 2).unwrap();
        assert_eq!(
            data.to_vec3s().unwrap(),
            vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]
        );
        assert!(data.to_quats().is_none());
    }

    #[test]
    fn test_decode_quats() {
        let blob = floats(&[0.0, 0.0, 0.0, 1.0]);
        let data = decode_accessor(&blob, 0, 0, 4, 1).unwrap();
        assert_eq!(data.to_quats().unwrap(), vec![Quat::IDENTITY]);
    }

    #[test]
    fn test_truncated_buffer() {
        let blob = floats(&[1.0, 2.0]);
        let err = decode_accessor(&blob, 0, 4, 1, 2).unwrap_err();
        match err {
            GlbError::TruncatedBuffer {
                offset,
                needed,
                available,
            } => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 8);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_offset_past_end() {
        let blob = floats(&[1.0]);
        let err = decode_accessor(&blob, 100, 0, 3, 1).unwrap_err();
        assert!(matches!(err, GlbError::TruncatedBuffer { available: 0, .. }));
    }

    #[test]
    fn test_huge_count_does_not_overflow() {
        let blob = floats(&[1.0]);
        let err = decode_accessor(&blob, 0, 0, 4, usize::MAX).unwrap_err();
        assert!(matches!(err, GlbError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_zero_components_rejected() {
        assert!(decode_accessor(&[], 0, 0, 0, 0).is_err());
    }

    #[test]
    fn test_empty_accessor() {
        let data = decode_accessor(&[], 0, 0, 3, 0).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.to_vec3s().unwrap(), Vec::<Vec3>::new());
    }

    #[test]
    fn test_every_nth_picks_spline_values() {
        let blob = floats(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let data = decode_accessor(&blob, 0, 0, 1, 6).unwrap();
        assert_eq!(data.every_nth(3, 1).components(), &[1.0, 4.0]);
    }

    #[test]
    fn test_reader_warns_on_non_float_component_type() {
        let doc = Document::from_json(
            r#"{
                "accessors": [{"bufferView": 0, "componentType": 5123, "count": 1, "type": "SCALAR"}],
                "bufferViews": [{"byteOffset": 0}]
            }"#,
        )
        .unwrap();
        let blob = floats(&[2.5]);
        let reader = AccessorReader::new(&doc, &blob);

        let mut lenient = Diagnostics::new(false);
        assert_eq!(reader.read_scalars(0, &mut lenient).unwrap(), vec![2.5]);
        assert_eq!(lenient.warnings().len(), 1);

        let mut strict = Diagnostics::new(true);
        assert!(matches!(
            reader.read_scalars(0, &mut strict),
            Err(GlbError::Policy(ParseWarning::UnsupportedComponentType { .. }))
        ));
    }

    #[test]
    fn test_reader_missing_buffer_view() {
        let doc = Document::from_json(
            r#"{"accessors": [{"componentType": 5126, "count": 1, "type": "SCALAR"}]}"#,
        )
        .unwrap();
        let reader = AccessorReader::new(&doc, &[]);
        let mut diagnostics = Diagnostics::new(false);
        assert!(matches!(
            reader.read_scalars(0, &mut diagnostics),
            Err(GlbError::ReferenceError(_))
        ));
    }
}
