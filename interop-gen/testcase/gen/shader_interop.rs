// This file is generated by interop-gen. Do NOT edit: any change is
// overwritten on the next run. The consuming crate needs `glam` (with its
// `bytemuck` feature) and `bytemuck` (with `derive`).
#![allow(non_camel_case_types)]
#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};

pub type GpuFloat = f32;
pub type GpuInt32 = i32;
pub type GpuUint32 = u32;
pub type GpuDouble = f64;
pub type GpuVec2 = glam::Vec2;
pub type GpuVec3 = glam::Vec3;
pub type GpuVec4 = glam::Vec4;
pub type GpuIVec2 = glam::IVec2;
pub type GpuIVec3 = glam::IVec3;
pub type GpuIVec4 = glam::IVec4;
pub type GpuUVec2 = glam::UVec2;
pub type GpuUVec3 = glam::UVec3;
pub type GpuUVec4 = glam::UVec4;
pub type GpuDVec2 = glam::DVec2;
pub type GpuDVec3 = glam::DVec3;
pub type GpuDVec4 = glam::DVec4;
pub type GpuMat2 = glam::Mat2;
pub type GpuMat3 = glam::Mat3;
pub type GpuMat4 = glam::Mat4;
pub type GpuDMat2 = glam::DMat2;
pub type GpuDMat3 = glam::DMat3;
pub type GpuDMat4 = glam::DMat4;

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

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Std140ArrayFloatElement {
    pub value: GpuFloat,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

/// Fixed `float` array stored at the std140 stride of 16 bytes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Std140ArrayFloat<const N: usize> {
    data: [Std140ArrayFloatElement; N],
}

unsafe impl<const N: usize> Zeroable for Std140ArrayFloat<N> {}
unsafe impl<const N: usize> Pod for Std140ArrayFloat<N> {}

impl<const N: usize> Std140ArrayFloat<N> {
    /// Copies `values` into the array, panicking unless exactly `N`
    /// elements are supplied.
    pub fn fill_from_slice(&mut self, values: &[f32]) {
        assert_eq!(values.len(), N, "wrong element count for Std140ArrayFloat");
        for (slot, value) in self.data.iter_mut().zip(values) {
            slot.value = (*value).into();
        }
    }
}

impl<const N: usize> core::ops::Index<usize> for Std140ArrayFloat<N> {
    type Output = GpuFloat;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index].value
    }
}

impl<const N: usize> core::ops::IndexMut<usize> for Std140ArrayFloat<N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index].value
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Std430ArrayVec4Element {
    pub value: GpuVec4,
}

/// Fixed `vec4` array stored at the std430 stride of 16 bytes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Std430ArrayVec4<const N: usize> {
    data: [Std430ArrayVec4Element; N],
}

unsafe impl<const N: usize> Zeroable for Std430ArrayVec4<N> {}
unsafe impl<const N: usize> Pod for Std430ArrayVec4<N> {}

impl<const N: usize> Std430ArrayVec4<N> {
    /// Copies `values` into the array, panicking unless exactly `N`
    /// elements are supplied.
    pub fn fill_from_slice(&mut self, values: &[glam::Vec4]) {
        assert_eq!(values.len(), N, "wrong element count for Std430ArrayVec4");
        for (slot, value) in self.data.iter_mut().zip(values) {
            slot.value = (*value).into();
        }
    }
}

impl<const N: usize> core::ops::Index<usize> for Std430ArrayVec4<N> {
    type Output = GpuVec4;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index].value
    }
}

impl<const N: usize> core::ops::IndexMut<usize> for Std430ArrayVec4<N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index].value
    }
}

/// `camera_data` buffer block (std140, binding = CAMERA_DATA_BUFFER_TARGET).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct camera_data {
    pub view_matrix: GpuMat4,
    pub projection_matrix: GpuMat4,
    pub view_projection_matrix: GpuMat4,
    pub camera_position: GpuVec3,
    pub camera_near: GpuFloat,
    pub camera_far: GpuFloat,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
    pub shadow_split_depths: Std140ArrayFloat<4>,
    pub frustum_culling: GpuBool,
    _pad3: u32,
    _pad4: u32,
    _pad5: u32,
}

/// `light_data` buffer block (std430, binding = 3).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct light_data {
    pub cluster_dimensions: GpuUVec2,
    pub light_count: GpuUint32,
    _pad0: u32,
    pub light_positions: Std430ArrayVec4<64>,
    pub light_colors: Std430ArrayVec4<64>,
}
