//! Ray-mesh intersection against the proxy collision geometry.
//!
//! Rays arrive in world space, are moved into the target's local space with
//! the proxy's synced transform, and tested with Moller-Trumbore. Hits carry
//! local position, interpolated normal and UV.

use glam::{Affine3A, Vec2, Vec3};
use tracing::debug;

use crate::constants::EPSILON;
use crate::target::MeshData;
use crate::types::HitSample;

/// A world-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection.
///
/// Both triangle windings are accepted.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec3 attribute using barycentric coordinates.
pub fn interpolate_vec3(v0: Vec3, v1: Vec3, v2: Vec3, u: f32, v: f32) -> Vec3 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Collision-only copy of the bound target's geometry.
///
/// Owned by the surface binding: acquired on bind and dropped on rebind or
/// session teardown. Never rendered or serialized.
#[derive(Debug)]
pub struct ProxyGeometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    world_from_local: Affine3A,
    local_from_world: Affine3A,
}

impl ProxyGeometry {
    /// Copy positions, normals, UVs and triangles from a mesh
    pub fn from_mesh(mesh: &MeshData, transform: Affine3A) -> Self {
        let mut proxy = Self {
            positions: mesh.positions.clone(),
            normals: mesh.normals.clone(),
            uvs: mesh.uvs.clone(),
            indices: mesh.indices.clone(),
            world_from_local: Affine3A::IDENTITY,
            local_from_world: Affine3A::IDENTITY,
        };
        proxy.sync_transform(transform);
        debug!(
            "Proxy geometry acquired: {} vertices, {} triangles",
            proxy.positions.len(),
            proxy.triangle_count()
        );
        proxy
    }

    /// Mirror the target's current world transform
    pub fn sync_transform(&mut self, transform: Affine3A) {
        if transform != self.world_from_local {
            self.world_from_local = transform;
            self.local_from_world = transform.inverse();
        }
    }

    pub fn world_from_local(&self) -> Affine3A {
        self.world_from_local
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn triangle(&self, tri_index: usize) -> Option<[usize; 3]> {
        let base = tri_index * 3;
        let tri = [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ];
        tri.iter()
            .all(|&i| i < self.positions.len())
            .then_some(tri)
    }

    /// Cast a world-space ray and return the closest hit in local space
    pub fn raycast(&self, ray: &Ray) -> Option<HitSample> {
        let origin = self.local_from_world.transform_point3(ray.origin);
        let far = self.local_from_world.transform_point3(ray.at(1.0));
        let local_dir = (far - origin).normalize_or_zero();
        if local_dir == Vec3::ZERO {
            return None;
        }

        let mut closest: Option<(TriangleHit, usize, [usize; 3])> = None;

        // Brute force; target meshes are editor-sized
        for tri_idx in 0..self.triangle_count() {
            let Some(tri) = self.triangle(tri_idx) else {
                continue;
            };
            let [i0, i1, i2] = tri;
            let hit = ray_triangle_intersection(
                origin,
                local_dir,
                self.positions[i0],
                self.positions[i1],
                self.positions[i2],
            );
            if let Some(hit) = hit {
                let dominated = closest.as_ref().is_some_and(|(prev, _, _)| hit.t >= prev.t);
                if !dominated {
                    closest = Some((hit, tri_idx, tri));
                }
            }
        }

        let (hit, face_id, [i0, i1, i2]) = closest?;
        let position = origin + local_dir * hit.t;

        let normal = if self.normals.len() == self.positions.len() {
            interpolate_vec3(
                self.normals[i0],
                self.normals[i1],
                self.normals[i2],
                hit.u,
                hit.v,
            )
            .normalize_or_zero()
        } else {
            let (v0, v1, v2) = (self.positions[i0], self.positions[i1], self.positions[i2]);
            (v1 - v0).cross(v2 - v0).normalize_or_zero()
        };

        let uv = if self.uvs.len() == self.positions.len() {
            interpolate_vec2(self.uvs[i0], self.uvs[i1], self.uvs[i2], hit.u, hit.v)
        } else {
            Vec2::ZERO
        };

        let world_hit = self.world_from_local.transform_point3(position);

        Some(HitSample {
            position,
            normal,
            uv,
            distance: world_hit.distance(ray.origin),
            face_id: face_id as u32,
        })
    }
}

impl Drop for ProxyGeometry {
    fn drop(&mut self) {
        debug!(
            "Proxy geometry released ({} triangles)",
            self.triangle_count()
        );
    }
}
