//! Data model shared by the parser, the layout engine and the emitter.

/// The binary layout rule-set a buffer block is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutStandard {
    /// GLSL `std140`: hosted layout, 16-byte rounding for matrices and arrays.
    Std140,
    /// GLSL `std430`: packed layout, natural power-of-two alignments.
    Std430,
}

impl LayoutStandard {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("std140") {
            Some(Self::Std140)
        } else if keyword.eq_ignore_ascii_case("std430") {
            Some(Self::Std430)
        } else {
            None
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Std140 => "std140",
            Self::Std430 => "std430",
        }
    }
}

/// Shape of a single buffer member, before any array length is applied.
///
/// `comp_size` is the byte width of one component (4 for 32-bit types,
/// 8 for 64-bit types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Scalar { comp_size: usize },
    Vector { comp_size: usize, count: usize },
    Matrix { comp_size: usize, rows: usize, cols: usize },
}

/// Array length suffix of a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    None,
    Fixed(usize),
    Dynamic,
}

/// One entry of the type catalog: a GLSL-side type name together with the
/// identifier used in generated type names and the native Rust type the
/// generated alias points at.
#[derive(Debug)]
pub struct TypeEntry {
    pub name: &'static str,
    pub ident: &'static str,
    pub native: &'static str,
    pub prim: PrimitiveType,
}

const fn scalar(comp_size: usize) -> PrimitiveType {
    PrimitiveType::Scalar { comp_size }
}

const fn vector(comp_size: usize, count: usize) -> PrimitiveType {
    PrimitiveType::Vector { comp_size, count }
}

const fn matrix(comp_size: usize, n: usize) -> PrimitiveType {
    PrimitiveType::Matrix { comp_size, rows: n, cols: n }
}

/// Every type name the generator recognizes inside a buffer block.
pub static TYPE_CATALOG: &[TypeEntry] = &[
    TypeEntry { name: "float", ident: "Float", native: "f32", prim: scalar(4) },
    TypeEntry { name: "int", ident: "Int32", native: "i32", prim: scalar(4) },
    TypeEntry { name: "int32", ident: "Int32", native: "i32", prim: scalar(4) },
    TypeEntry { name: "uint", ident: "Uint32", native: "u32", prim: scalar(4) },
    TypeEntry { name: "uint32", ident: "Uint32", native: "u32", prim: scalar(4) },
    TypeEntry { name: "bool", ident: "Bool", native: "bool", prim: scalar(4) },
    TypeEntry { name: "double", ident: "Double", native: "f64", prim: scalar(8) },
    TypeEntry { name: "vec2", ident: "Vec2", native: "glam::Vec2", prim: vector(4, 2) },
    TypeEntry { name: "vec3", ident: "Vec3", native: "glam::Vec3", prim: vector(4, 3) },
    TypeEntry { name: "vec4", ident: "Vec4", native: "glam::Vec4", prim: vector(4, 4) },
    TypeEntry { name: "ivec2", ident: "IVec2", native: "glam::IVec2", prim: vector(4, 2) },
    TypeEntry { name: "ivec3", ident: "IVec3", native: "glam::IVec3", prim: vector(4, 3) },
    TypeEntry { name: "ivec4", ident: "IVec4", native: "glam::IVec4", prim: vector(4, 4) },
    TypeEntry { name: "uvec2", ident: "UVec2", native: "glam::UVec2", prim: vector(4, 2) },
    TypeEntry { name: "uvec3", ident: "UVec3", native: "glam::UVec3", prim: vector(4, 3) },
    TypeEntry { name: "uvec4", ident: "UVec4", native: "glam::UVec4", prim: vector(4, 4) },
    TypeEntry { name: "bvec2", ident: "BVec2", native: "[GpuBool; 2]", prim: vector(4, 2) },
    TypeEntry { name: "bvec3", ident: "BVec3", native: "[GpuBool; 3]", prim: vector(4, 3) },
    TypeEntry { name: "bvec4", ident: "BVec4", native: "[GpuBool; 4]", prim: vector(4, 4) },
    TypeEntry { name: "dvec2", ident: "DVec2", native: "glam::DVec2", prim: vector(8, 2) },
    TypeEntry { name: "dvec3", ident: "DVec3", native: "glam::DVec3", prim: vector(8, 3) },
    TypeEntry { name: "dvec4", ident: "DVec4", native: "glam::DVec4", prim: vector(8, 4) },
    TypeEntry { name: "mat2", ident: "Mat2", native: "glam::Mat2", prim: matrix(4, 2) },
    TypeEntry { name: "mat3", ident: "Mat3", native: "glam::Mat3", prim: matrix(4, 3) },
    TypeEntry { name: "mat4", ident: "Mat4", native: "glam::Mat4", prim: matrix(4, 4) },
    TypeEntry { name: "dmat2", ident: "DMat2", native: "glam::DMat2", prim: matrix(8, 2) },
    TypeEntry { name: "dmat3", ident: "DMat3", native: "glam::DMat3", prim: matrix(8, 3) },
    TypeEntry { name: "dmat4", ident: "DMat4", native: "glam::DMat4", prim: matrix(8, 4) },
];

/// Case-insensitive catalog lookup.
pub fn type_entry(name: &str) -> Option<&'static TypeEntry> {
    TYPE_CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

/// One member of a sealed block, with its layout already computed.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub entry: &'static TypeEntry,
    pub array: ArrayLen,
    pub alignment: usize,
    pub size: usize,
    pub offset: usize,
}

/// One buffer block declaration, in declaration order.
///
/// The binding value from the qualifier clause is carried verbatim but never
/// interpreted. Blocks are immutable once sealed by the parser.
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub binding: String,
    pub standard: LayoutStandard,
    pub fields: Vec<Field>,
}

impl Block {
    /// Byte offset one past the last field, before any trailing rounding.
    pub fn byte_end(&self) -> usize {
        self.fields
            .last()
            .map(|field| field.offset + field.size)
            .unwrap_or(0)
    }
}
