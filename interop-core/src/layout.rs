//! The std140/std430 layout engine.
//!
//! Pure arithmetic over alignments and sizes; no I/O. The rules follow the
//! GL uniform/storage block layout for the type shapes the catalog exposes:
//! scalars and vectors align to the next power of two of their byte size,
//! matrices are laid out column by column, and fixed arrays get a per-standard
//! alignment applied to their total size.

use anyhow::{bail, ensure, Result};

use crate::types::{ArrayLen, LayoutStandard, PrimitiveType};

/// `n` rounded up to the next multiple of `k`.
pub fn round_up(k: usize, n: usize) -> usize {
    (n + k - 1) / k * k
}

fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}

/// Alignment and size of one element, ignoring any array suffix.
fn base_layout(prim: PrimitiveType, standard: LayoutStandard) -> Result<(usize, usize)> {
    let layout = match prim {
        PrimitiveType::Scalar { comp_size } => (next_pow2(comp_size), comp_size),
        PrimitiveType::Vector { comp_size, count } => {
            (next_pow2(count * comp_size), count * comp_size)
        }
        PrimitiveType::Matrix { comp_size, rows, cols } => {
            ensure!(rows == cols, "only square matrices are supported ({rows}x{cols})");
            match standard {
                // Each column is padded out to a 16-byte-rounded register.
                LayoutStandard::Std140 => {
                    let alignment = round_up(16, rows * comp_size);
                    (alignment, alignment * cols)
                }
                LayoutStandard::Std430 => {
                    (next_pow2(rows * comp_size), rows * cols * comp_size)
                }
            }
        }
    };
    Ok(layout)
}

/// Alignment and size of a member with the given array suffix.
pub fn layout_of(
    prim: PrimitiveType,
    array: ArrayLen,
    standard: LayoutStandard,
) -> Result<(usize, usize)> {
    match array {
        ArrayLen::None => base_layout(prim, standard),
        ArrayLen::Fixed(count) => {
            ensure!(count > 0, "fixed array length must be positive");
            let (align_e, size_e) = base_layout(prim, standard)?;
            let alignment = array_alignment(align_e, standard);
            Ok((alignment, round_up(alignment, size_e * count)))
        }
        ArrayLen::Dynamic => bail!("dynamic sized arrays are not implemented"),
    }
}

/// Alignment of a fixed array whose element alignment is `align_e`.
pub fn array_alignment(align_e: usize, standard: LayoutStandard) -> usize {
    match standard {
        LayoutStandard::Std140 => round_up(16, align_e),
        LayoutStandard::Std430 => align_e,
    }
}

/// Distance between consecutive elements of a fixed array, used by the
/// emitter to synthesize per-element padding inside the array wrappers.
pub fn array_stride(prim: PrimitiveType, standard: LayoutStandard) -> Result<usize> {
    let (align_e, size_e) = base_layout(prim, standard)?;
    Ok(round_up(array_alignment(align_e, standard), size_e))
}

/// Element size of a fixed array, before the stride rounding.
pub fn element_size(prim: PrimitiveType, standard: LayoutStandard) -> Result<usize> {
    Ok(base_layout(prim, standard)?.1)
}

/// Places a field of the given alignment and size at the end of a block,
/// returning its offset and the new running offset. Fields are never
/// reordered; the shading-language compiler places them sequentially and the
/// host side has to match it byte for byte.
pub fn place(alignment: usize, size: usize, running_offset: usize) -> (usize, usize) {
    let offset = round_up(alignment, running_offset);
    (offset, offset + size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::type_entry;

    fn layout(name: &str, array: ArrayLen, standard: LayoutStandard) -> (usize, usize) {
        layout_of(type_entry(name).unwrap().prim, array, standard).unwrap()
    }

    #[test]
    fn test_scalars() {
        for standard in [LayoutStandard::Std140, LayoutStandard::Std430] {
            assert_eq!(layout("float", ArrayLen::None, standard), (4, 4));
            assert_eq!(layout("uint", ArrayLen::None, standard), (4, 4));
            assert_eq!(layout("bool", ArrayLen::None, standard), (4, 4));
            assert_eq!(layout("double", ArrayLen::None, standard), (8, 8));
        }
    }

    #[test]
    fn test_vectors() {
        for standard in [LayoutStandard::Std140, LayoutStandard::Std430] {
            assert_eq!(layout("vec2", ArrayLen::None, standard), (8, 8));
            // 12 bytes of data behind a 16-byte alignment.
            assert_eq!(layout("vec3", ArrayLen::None, standard), (16, 12));
            assert_eq!(layout("vec4", ArrayLen::None, standard), (16, 16));
            assert_eq!(layout("dvec3", ArrayLen::None, standard), (32, 24));
        }
    }

    #[test]
    fn test_matrices_diverge_between_standards() {
        assert_eq!(layout("mat3", ArrayLen::None, LayoutStandard::Std140), (16, 48));
        assert_eq!(layout("mat3", ArrayLen::None, LayoutStandard::Std430), (16, 36));
        assert_eq!(layout("mat4", ArrayLen::None, LayoutStandard::Std140), (16, 64));
        assert_eq!(layout("mat4", ArrayLen::None, LayoutStandard::Std430), (16, 64));
        assert_eq!(layout("dmat3", ArrayLen::None, LayoutStandard::Std140), (32, 96));
        assert_eq!(layout("dmat3", ArrayLen::None, LayoutStandard::Std430), (32, 72));
    }

    #[test]
    fn test_non_square_matrix_is_fatal() {
        let prim = PrimitiveType::Matrix { comp_size: 4, rows: 3, cols: 4 };
        assert!(layout_of(prim, ArrayLen::None, LayoutStandard::Std140).is_err());
    }

    #[test]
    fn test_fixed_arrays() {
        // Five floats: std140 rounds both the alignment and the total size
        // up to 16, std430 keeps them tight.
        assert_eq!(layout("float", ArrayLen::Fixed(5), LayoutStandard::Std140), (16, 32));
        assert_eq!(layout("float", ArrayLen::Fixed(5), LayoutStandard::Std430), (4, 20));

        assert_eq!(layout("vec4", ArrayLen::Fixed(3), LayoutStandard::Std140), (16, 48));
        assert_eq!(layout("vec4", ArrayLen::Fixed(3), LayoutStandard::Std430), (16, 48));
    }

    #[test]
    fn test_zero_length_array_is_fatal() {
        assert!(layout_of(
            PrimitiveType::Scalar { comp_size: 4 },
            ArrayLen::Fixed(0),
            LayoutStandard::Std430,
        )
        .is_err());
    }

    #[test]
    fn test_dynamic_array_is_fatal() {
        assert!(layout_of(
            PrimitiveType::Scalar { comp_size: 4 },
            ArrayLen::Dynamic,
            LayoutStandard::Std140,
        )
        .is_err());
    }

    #[test]
    fn test_array_strides() {
        let float = type_entry("float").unwrap().prim;
        assert_eq!(array_stride(float, LayoutStandard::Std140).unwrap(), 16);
        assert_eq!(array_stride(float, LayoutStandard::Std430).unwrap(), 4);

        let vec3 = type_entry("vec3").unwrap().prim;
        assert_eq!(array_stride(vec3, LayoutStandard::Std140).unwrap(), 16);
        assert_eq!(array_stride(vec3, LayoutStandard::Std430).unwrap(), 16);

        let mat4 = type_entry("mat4").unwrap().prim;
        assert_eq!(array_stride(mat4, LayoutStandard::Std140).unwrap(), 64);
    }

    #[test]
    fn test_place_accumulates_in_declaration_order() {
        // vec3 then float: the scalar slots into the vec3's tail padding.
        let (a_align, a_size) = layout("vec3", ArrayLen::None, LayoutStandard::Std140);
        let (a_off, running) = place(a_align, a_size, 0);
        assert_eq!((a_off, running), (0, 12));

        let (b_align, b_size) = layout("float", ArrayLen::None, LayoutStandard::Std140);
        let (b_off, running) = place(b_align, b_size, running);
        assert_eq!((b_off, running), (12, 16));

        // A following vec4 starts on the next 16-byte boundary.
        let (c_align, c_size) = layout("vec4", ArrayLen::None, LayoutStandard::Std140);
        let (c_off, _) = place(c_align, c_size, running);
        assert_eq!(c_off, 16);
    }
}
