//! Renders the parsed blocks as a Rust module.
//!
//! The output is a single self-contained source file: primitive aliases in
//! the `Gpu` namespace, the 4-byte bool wrapper, padded std140 matrix
//! wrappers, one padded array wrapper per (type, standard) pair in use, and
//! one `#[repr(C)]` struct per block with explicit padding fields closing
//! every gap the layout engine produced and rounding the struct out to its
//! own alignment, so the `Pod` derive never sees compiler-inserted padding.
//! Rendering is a pure function of the
//! sealed blocks, so re-running it on unchanged input yields byte-identical
//! text; the artifact is never meant to be edited by hand.

use anyhow::{bail, Result};

use crate::layout::{array_stride, element_size};
use crate::types::{ArrayLen, Block, Field, LayoutStandard, PrimitiveType, TypeEntry, TYPE_CATALOG};

pub fn render_module(blocks: &[Block]) -> Result<String> {
    let mut out = String::new();
    out.push_str(HEADER);
    write_type_defs(&mut out);
    write_array_wrappers(&mut out, blocks)?;
    for block in blocks {
        write_block(&mut out, block)?;
    }
    Ok(out)
}

const HEADER: &str = "\
// This file is generated by interop-gen. Do NOT edit: any change is
// overwritten on the next run. The consuming crate needs `glam` (with its
// `bytemuck` feature) and `bytemuck` (with `derive`).
#![allow(non_camel_case_types)]
#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};

";

fn std_prefix(standard: LayoutStandard) -> &'static str {
    match standard {
        LayoutStandard::Std140 => "Std140",
        LayoutStandard::Std430 => "Std430",
    }
}

/// The generated type a plain (non-array) field uses.
///
/// std140 pads matrix columns out to 16 bytes, which makes the native glam
/// types too small for `mat2`, `mat3` and `dmat3`; those go through the
/// emitted column-padded wrappers instead of the plain aliases.
fn plain_type(entry: &TypeEntry, standard: LayoutStandard) -> String {
    if standard == LayoutStandard::Std140 {
        match entry.name {
            "mat2" => return "Std140Mat2".to_owned(),
            "mat3" => return "Std140Mat3".to_owned(),
            "dmat3" => return "Std140DMat3".to_owned(),
            _ => {}
        }
    }
    format!("Gpu{}", entry.ident)
}

fn array_type(entry: &TypeEntry, standard: LayoutStandard) -> String {
    format!("{}Array{}", std_prefix(standard), entry.ident)
}

fn field_type(field: &Field, standard: LayoutStandard) -> Result<String> {
    match field.array {
        ArrayLen::None => Ok(plain_type(field.entry, standard)),
        ArrayLen::Fixed(count) => Ok(format!("{}<{}>", array_type(field.entry, standard), count)),
        ArrayLen::Dynamic => bail!("dynamic sized arrays are not implemented"),
    }
}

/// Alignment of the emitted Rust type for one catalog entry.
///
/// glam maps `vec4`, `mat2` and `mat4` onto 16-byte aligned SIMD types;
/// everything else aligns to its component width, as do the emitted std140
/// matrix wrappers (plain column arrays).
fn rust_align(entry: &TypeEntry, standard: LayoutStandard) -> usize {
    let comp_size = match entry.prim {
        PrimitiveType::Scalar { comp_size }
        | PrimitiveType::Vector { comp_size, .. }
        | PrimitiveType::Matrix { comp_size, .. } => comp_size,
    };
    if standard == LayoutStandard::Std140 && matches!(entry.name, "mat2" | "mat3" | "dmat3") {
        return comp_size;
    }
    match entry.ident {
        "Vec4" | "Mat2" | "Mat4" => 16,
        _ => comp_size,
    }
}

/// In-memory `(size, alignment)` of the emitted Rust type for a field.
///
/// A plain field occupies exactly its declared size, but a fixed array
/// wrapper spans the element stride times the length, which exceeds the
/// declared array size whenever the element size is not a stride multiple.
fn rust_layout(field: &Field, standard: LayoutStandard) -> Result<(usize, usize)> {
    let align = rust_align(field.entry, standard);
    match field.array {
        ArrayLen::None => Ok((field.size, align)),
        ArrayLen::Fixed(count) => {
            let stride = array_stride(field.entry.prim, standard)?;
            // the element struct carries u32 pad fields
            Ok((stride * count, align.max(4)))
        }
        ArrayLen::Dynamic => bail!("dynamic sized arrays are not implemented"),
    }
}

/// Aliases for every catalog entry, then the bool wrapper and the padded
/// std140 matrix wrappers.
fn write_type_defs(out: &mut String) {
    let mut seen: Vec<&str> = Vec::new();
    for entry in TYPE_CATALOG {
        // bool-based types are defined below, after GpuBool itself.
        if entry.ident == "Bool" || entry.ident.starts_with("BVec") {
            continue;
        }
        if seen.contains(&entry.ident) {
            continue;
        }
        seen.push(entry.ident);
        out.push_str(&format!("pub type Gpu{} = {};\n", entry.ident, entry.native));
    }

    out.push_str(BOOL_AND_MATRIX_DEFS);
}

const BOOL_AND_MATRIX_DEFS: &str = "
/// A boolean occupying exactly 4 bytes, the size shading languages give
/// `bool` inside a buffer block.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuBool(u32);

impl From<bool> for GpuBool {
    fn from(value: bool) -> Self {
        Self(value as u32)
    }
}

impl From<GpuBool> for bool {
    fn from(value: GpuBool) -> Self {
        value.0 != 0
    }
}

pub type GpuBVec2 = [GpuBool; 2];
pub type GpuBVec3 = [GpuBool; 3];
pub type GpuBVec4 = [GpuBool; 4];

/// Column-major `mat2` with each column padded out to 16 bytes (std140).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Std140Mat2 {
    cols: [[f32; 4]; 2],
}

impl From<glam::Mat2> for Std140Mat2 {
    fn from(m: glam::Mat2) -> Self {
        let mut cols = [[0.0; 4]; 2];
        for (col, axis) in cols.iter_mut().zip([m.x_axis, m.y_axis]) {
            col[..2].copy_from_slice(&axis.to_array());
        }
        Self { cols }
    }
}

impl From<Std140Mat2> for glam::Mat2 {
    fn from(m: Std140Mat2) -> Self {
        glam::Mat2::from_cols(
            glam::Vec2::new(m.cols[0][0], m.cols[0][1]),
            glam::Vec2::new(m.cols[1][0], m.cols[1][1]),
        )
    }
}

/// Column-major `mat3` with each column padded out to 16 bytes (std140).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Std140Mat3 {
    cols: [[f32; 4]; 3],
}

impl From<glam::Mat3> for Std140Mat3 {
    fn from(m: glam::Mat3) -> Self {
        let mut cols = [[0.0; 4]; 3];
        for (col, axis) in cols.iter_mut().zip([m.x_axis, m.y_axis, m.z_axis]) {
            col[..3].copy_from_slice(&axis.to_array());
        }
        Self { cols }
    }
}

impl From<Std140Mat3> for glam::Mat3 {
    fn from(m: Std140Mat3) -> Self {
        glam::Mat3::from_cols(
            glam::Vec3::new(m.cols[0][0], m.cols[0][1], m.cols[0][2]),
            glam::Vec3::new(m.cols[1][0], m.cols[1][1], m.cols[1][2]),
            glam::Vec3::new(m.cols[2][0], m.cols[2][1], m.cols[2][2]),
        )
    }
}

/// Column-major `dmat3` with each column padded out to 32 bytes (std140).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Std140DMat3 {
    cols: [[f64; 4]; 3],
}

impl From<glam::DMat3> for Std140DMat3 {
    fn from(m: glam::DMat3) -> Self {
        let mut cols = [[0.0; 4]; 3];
        for (col, axis) in cols.iter_mut().zip([m.x_axis, m.y_axis, m.z_axis]) {
            col[..3].copy_from_slice(&axis.to_array());
        }
        Self { cols }
    }
}

impl From<Std140DMat3> for glam::DMat3 {
    fn from(m: Std140DMat3) -> Self {
        glam::DMat3::from_cols(
            glam::DVec3::new(m.cols[0][0], m.cols[0][1], m.cols[0][2]),
            glam::DVec3::new(m.cols[1][0], m.cols[1][1], m.cols[1][2]),
            glam::DVec3::new(m.cols[2][0], m.cols[2][1], m.cols[2][2]),
        )
    }
}
";

/// One padded array wrapper per (type, standard) pair referenced by a fixed
/// array field, in first-use order.
fn write_array_wrappers(out: &mut String, blocks: &[Block]) -> Result<()> {
    let mut used: Vec<(LayoutStandard, &TypeEntry)> = Vec::new();
    for block in blocks {
        for field in &block.fields {
            if matches!(field.array, ArrayLen::Fixed(_))
                && !used
                    .iter()
                    .any(|(s, e)| *s == block.standard && e.ident == field.entry.ident)
            {
                used.push((block.standard, field.entry));
            }
        }
    }

    for (standard, entry) in used {
        write_array_wrapper(out, standard, entry)?;
    }
    Ok(())
}

fn write_array_wrapper(
    out: &mut String,
    standard: LayoutStandard,
    entry: &TypeEntry,
) -> Result<()> {
    let stride = array_stride(entry.prim, standard)?;
    let size_e = element_size(entry.prim, standard)?;
    debug_assert_eq!((stride - size_e) % 4, 0);

    let value_ty = plain_type(entry, standard);
    let array_ident = array_type(entry, standard);
    let element_ident = format!("{array_ident}Element");

    out.push_str(&format!(
        "\n#[repr(C)]\n\
         #[derive(Clone, Copy, Pod, Zeroable)]\n\
         pub struct {element_ident} {{\n    pub value: {value_ty},\n"
    ));
    for pad in 0..(stride - size_e) / 4 {
        out.push_str(&format!("    _pad{pad}: u32,\n"));
    }
    out.push_str("}\n");

    out.push_str(&format!(
        "\n/// Fixed `{name}` array stored at the {keyword} stride of {stride} bytes.\n\
         #[repr(C)]\n\
         #[derive(Clone, Copy)]\n\
         pub struct {array_ident}<const N: usize> {{\n\
         \x20   data: [{element_ident}; N],\n\
         }}\n\
         \n\
         unsafe impl<const N: usize> Zeroable for {array_ident}<N> {{}}\n\
         unsafe impl<const N: usize> Pod for {array_ident}<N> {{}}\n\
         \n\
         impl<const N: usize> {array_ident}<N> {{\n\
         \x20   /// Copies `values` into the array, panicking unless exactly `N`\n\
         \x20   /// elements are supplied.\n\
         \x20   pub fn fill_from_slice(&mut self, values: &[{native}]) {{\n\
         \x20       assert_eq!(values.len(), N, \"wrong element count for {array_ident}\");\n\
         \x20       for (slot, value) in self.data.iter_mut().zip(values) {{\n\
         \x20           slot.value = (*value).into();\n\
         \x20       }}\n\
         \x20   }}\n\
         }}\n\
         \n\
         impl<const N: usize> core::ops::Index<usize> for {array_ident}<N> {{\n\
         \x20   type Output = {value_ty};\n\
         \n\
         \x20   fn index(&self, index: usize) -> &Self::Output {{\n\
         \x20       &self.data[index].value\n\
         \x20   }}\n\
         }}\n\
         \n\
         impl<const N: usize> core::ops::IndexMut<usize> for {array_ident}<N> {{\n\
         \x20   fn index_mut(&mut self, index: usize) -> &mut Self::Output {{\n\
         \x20       &mut self.data[index].value\n\
         \x20   }}\n\
         }}\n",
        name = entry.name,
        keyword = standard.keyword(),
        native = entry.native,
    ));
    Ok(())
}

fn write_block(out: &mut String, block: &Block) -> Result<()> {
    out.push_str(&format!(
        "\n/// `{}` buffer block ({}, binding = {}).\n\
         #[repr(C)]\n\
         #[derive(Clone, Copy, Pod, Zeroable)]\n\
         pub struct {} {{\n",
        block.name,
        block.standard.keyword(),
        block.binding,
        block.name,
    ));

    // Two running ends: `layout_end` follows the declared offsets and sets
    // the padding between fields, `rust_end` follows the real sizes of the
    // emitted types (array wrappers are stride times length). `derive(Pod)`
    // rejects any struct the compiler pads, so the tail is rounded out to
    // the struct's own alignment with explicit pad fields.
    let mut layout_end = 0;
    let mut rust_end = 0;
    let mut struct_align = 4;
    let mut pad_counter = 0;
    for field in &block.fields {
        while layout_end < field.offset {
            out.push_str(&format!("    _pad{pad_counter}: u32,\n"));
            pad_counter += 1;
            layout_end += 4;
            rust_end += 4;
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field.name,
            field_type(field, block.standard)?
        ));
        layout_end += field.size;
        let (size, align) = rust_layout(field, block.standard)?;
        rust_end += size;
        struct_align = struct_align.max(align);
    }
    while rust_end % struct_align != 0 {
        out.push_str(&format!("    _pad{pad_counter}: u32,\n"));
        pad_counter += 1;
        rust_end += 4;
    }
    out.push_str("}\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    const SOURCE: &str = r#"
#define BONE_COUNT 2

layout(binding = 0, std140) uniform model_data
{
    mat4 model_matrix;
    mat3 normal_matrix;
    float occlusion[BONE_COUNT];
    bool has_normals;
};

layout(binding = 1, std430) buffer cull_data
{
    float distances[BONE_COUNT];
    vec4 planes[6];
};
"#;

    fn render() -> String {
        render_module(&parse_source(SOURCE, "test").unwrap()).unwrap()
    }

    #[test]
    fn test_preamble_has_aliases_and_wrappers() {
        let text = render();
        assert!(text.contains("pub type GpuFloat = f32;"));
        assert!(text.contains("pub type GpuMat4 = glam::Mat4;"));
        assert!(text.contains("pub struct GpuBool(u32);"));
        assert!(text.contains("pub struct Std140Mat3 {"));
    }

    #[test]
    fn test_plain_types_follow_the_standard() {
        let text = render();
        assert!(text.contains("pub model_matrix: GpuMat4,"));
        // std140 mat3 needs the column-padded wrapper.
        assert!(text.contains("pub normal_matrix: Std140Mat3,"));
        assert!(text.contains("pub has_normals: GpuBool,"));
    }

    #[test]
    fn test_array_wrappers_are_emitted_per_standard() {
        let text = render();
        assert!(text.contains("pub struct Std140ArrayFloat<const N: usize>"));
        assert!(text.contains("pub struct Std430ArrayFloat<const N: usize>"));
        assert!(text.contains("pub struct Std430ArrayVec4<const N: usize>"));
        assert!(text.contains("pub occlusion: Std140ArrayFloat<2>,"));
        assert!(text.contains("pub distances: Std430ArrayFloat<2>,"));
        assert!(text.contains("pub planes: Std430ArrayVec4<6>,"));
    }

    #[test]
    fn test_element_padding_matches_stride() {
        let text = render();
        // std140 float stride is 16: three u32 pads after the element value.
        let element = text
            .split("pub struct Std140ArrayFloatElement {")
            .nth(1)
            .unwrap()
            .split('}')
            .next()
            .unwrap();
        assert_eq!(element.matches("_pad").count(), 3);

        // std430 float stride is 4: no element padding at all.
        let element = text
            .split("pub struct Std430ArrayFloatElement {")
            .nth(1)
            .unwrap()
            .split('}')
            .next()
            .unwrap();
        assert_eq!(element.matches("_pad").count(), 0);
    }

    #[test]
    fn test_struct_padding_closes_gaps() {
        let source = r#"
layout(binding = 0, std140) uniform gap_block
{
    float scale;
    vec4 color;
};
"#;
        let text = render_module(&parse_source(source, "test").unwrap()).unwrap();
        let body = text
            .split("pub struct gap_block {")
            .nth(1)
            .unwrap()
            .split('}')
            .next()
            .unwrap();
        // float at 0, vec4 at 16: twelve bytes of padding in between.
        assert_eq!(body.matches("_pad").count(), 3);
        assert!(body.contains("pub scale: GpuFloat,"));
        assert!(body.contains("pub color: GpuVec4,"));
    }

    #[test]
    fn test_trailing_padding_rounds_out_simd_alignment() {
        let source = r#"
layout(binding = 0, std140) uniform transform_block
{
    mat4 transform;
    float exposure;
};
"#;
        let text = render_module(&parse_source(source, "test").unwrap()).unwrap();
        // glam::Mat4 raises the struct alignment to 16; the float leaves the
        // body at 68 bytes, so three trailing u32 pads round it out to 80.
        assert!(text.contains(
            "    pub exposure: GpuFloat,\n\
             \x20   _pad0: u32,\n\
             \x20   _pad1: u32,\n\
             \x20   _pad2: u32,\n\
             }"
        ));
    }

    #[test]
    fn test_aligned_block_gets_no_trailing_padding() {
        let source = r#"
layout(binding = 0, std430) buffer cluster_block
{
    uvec2 dimensions;
    uint count;
    vec4 bounds;
};
"#;
        let text = render_module(&parse_source(source, "test").unwrap()).unwrap();
        let body = text
            .split("pub struct cluster_block {")
            .nth(1)
            .unwrap()
            .split('}')
            .next()
            .unwrap();
        // One pad lifts `bounds` to offset 16; the 32-byte body already
        // matches the 16-byte struct alignment, so the tail stays bare.
        assert_eq!(body.matches("_pad").count(), 1);
        assert!(body.trim_end().ends_with("pub bounds: GpuVec4,"));
    }

    #[test]
    fn test_array_fields_span_their_full_stride() {
        let source = r#"
layout(binding = 0, std140) uniform weight_block
{
    mat4 transform;
    float weights[2];
    float tail;
};
"#;
        let text = render_module(&parse_source(source, "test").unwrap()).unwrap();
        let body = text
            .split("pub struct weight_block {")
            .nth(1)
            .unwrap()
            .split('}')
            .next()
            .unwrap();
        // The wrapper really occupies 2 * 16 bytes, putting `tail` at 128
        // with nothing in between and leaving 132 to round up to 144.
        assert!(body.contains(
            "    pub weights: Std140ArrayFloat<2>,\n\
             \x20   pub tail: GpuFloat,\n"
        ));
        assert_eq!(body.matches("_pad").count(), 3);
    }

    #[test]
    fn test_blocks_render_in_input_order() {
        let text = render();
        let model = text.find("pub struct model_data").unwrap();
        let cull = text.find("pub struct cull_data").unwrap();
        assert!(model < cull);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        assert_eq!(render(), render());
    }
}
