use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

use crate::asset::{AssetPart, LoadedModel, Material};
use crate::geometry::Mesh;
use crate::math::linear_to_srgb;

/// Upper bound on a downloaded model body
const MAX_MODEL_BYTES: u64 = 64 * 1024 * 1024;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads a glTF/GLB model from a filesystem path or an http(s) URL
///
/// Blocking; the provisioner calls this from its worker thread. `timeout`
/// bounds the whole HTTP exchange, so the worker does not outlive a stalled
/// server; it has no effect on local files.
pub fn load_model(source: &str, timeout: Option<Duration>) -> Result<LoadedModel> {
    if is_remote(source) {
        let bytes = fetch(source, timeout)?;
        load_model_from_slice(&bytes, source)
    } else {
        load_model_from_path(source)
    }
}

fn load_model_from_path(path: impl AsRef<Path>) -> Result<LoadedModel> {
    let path = path.as_ref();
    debug!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    convert_document(&document, &buffers, &path.display().to_string())
}

/// Parses an in-memory glTF/GLB; external buffer URIs are not resolved
pub fn load_model_from_slice(bytes: &[u8], name: &str) -> Result<LoadedModel> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).with_context(|| format!("Failed to parse glTF data from {name}"))?;

    convert_document(&document, &buffers, name)
}

fn fetch(url: &str, timeout: Option<Duration>) -> Result<Vec<u8>> {
    debug!("Fetching model: {} (timeout {:?})", url, timeout);

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .build()
        .into();

    let mut response = agent
        .get(url)
        .call()
        .with_context(|| format!("Request for {url} failed"))?;

    response
        .body_mut()
        .with_config()
        .limit(MAX_MODEL_BYTES)
        .read_to_vec()
        .with_context(|| format!("Failed to read response body from {url}"))
}

fn convert_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    name: &str,
) -> Result<LoadedModel> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file contains no scene")?;

    let materials: Vec<Material> = document.materials().map(convert_material).collect();

    let mut parts = Vec::new();
    for node in scene.nodes() {
        process_node(&node, buffers, &Mat4::IDENTITY, &materials, &mut parts)?;
    }

    let model = LoadedModel {
        name: name.to_string(),
        parts,
    };

    if model.triangle_count() == 0 {
        bail!("glTF scene {:?} has no triangle geometry", scene.name().unwrap_or(name));
    }

    info!(
        "glTF loaded: {} parts, {} triangles, {} materials",
        model.parts.len(),
        model.triangle_count(),
        materials.len()
    );

    Ok(model)
}

fn convert_material(material: gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _a] = pbr.base_color_factor();

    Material {
        base_color: linear_to_srgb([r, g, b]),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        ..Material::default()
    }
}

/// Recursively processes nodes, baking each global transform into its meshes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    materials: &[Material],
    parts: &mut Vec<AssetPart>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, materials, parts)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, materials, parts)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    materials: &[Material],
    parts: &mut Vec<AssetPart>,
) -> Result<()> {
    debug!("  Processing mesh: {:?}", mesh.name());

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("    Skipping {:?} primitive", primitive.mode());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(Vec3::from_array)
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            bail!("Index {} out of range for {} vertices", bad, positions.len());
        }

        let indices: Vec<u32> = indices.chunks_exact(3).flatten().copied().collect();

        let mut part_mesh = match reader.read_normals() {
            Some(normals) => Mesh {
                normals: normals.map(Vec3::from_array).collect(),
                positions,
                indices,
            },
            None => Mesh::from_triangles(positions, indices),
        };
        if part_mesh.normals.len() != part_mesh.positions.len() {
            part_mesh.compute_vertex_normals();
        }
        part_mesh.transform(transform);

        let material = primitive
            .material()
            .index()
            .and_then(|i| materials.get(i))
            .copied()
            .unwrap_or_default();

        parts.push(AssetPart {
            mesh: part_mesh,
            material,
            casts_shadow: true,
            receives_shadow: false,
        });
    }

    Ok(())
}
