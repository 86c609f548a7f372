use bean_viewer::asset::AssetKind;
use bean_viewer::loaders::{load_model, load_model_from_slice};
use bean_viewer::provision::{LoadOutcome, ModelProvisioner, PlaceholderSettings, ProvisionSettings};
use glam::Vec3;
use std::net::TcpListener;
use std::time::{Duration, Instant};

fn base64(bytes: &[u8]) -> String {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for chunk in bytes.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
        for i in 0..4usize {
            if i <= chunk.len() {
                out.push(TABLE[((n >> (18 - 6 * i)) & 63) as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

/// One red, fully metallic triangle under a node translated 10 units along X
fn triangle_gltf() -> String {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let bytes: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();

    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [10.0, 0.0, 0.0] }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}],
  "materials": [{{
    "pbrMetallicRoughness": {{
      "baseColorFactor": [1.0, 0.0, 0.0, 1.0],
      "metallicFactor": 1.0,
      "roughnessFactor": 0.0
    }}
  }}],
  "buffers": [{{
    "byteLength": {len},
    "uri": "data:application/octet-stream;base64,{data}"
  }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": {len} }}],
  "accessors": [{{
    "bufferView": 0,
    "componentType": 5126,
    "count": 3,
    "type": "VEC3",
    "min": [0.0, 0.0, 0.0],
    "max": [1.0, 1.0, 0.0]
  }}]
}}"#,
        len = bytes.len(),
        data = base64(&bytes)
    )
}

#[cfg(test)]
mod gltf_loader_tests {
    use super::*;

    #[test]
    fn test_base64_helper() {
        assert_eq!(base64(b"Man"), "TWFu");
        assert_eq!(base64(b"Ma"), "TWE=");
        assert_eq!(base64(b"M"), "TQ==");
    }

    #[test]
    fn test_embedded_triangle_loads_with_node_transform() {
        let model = load_model_from_slice(triangle_gltf().as_bytes(), "triangle").unwrap();

        assert_eq!(model.parts.len(), 1);
        assert_eq!(model.triangle_count(), 1);

        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 0.0));

        let material = model.parts[0].material;
        assert!((material.base_color[0] - 1.0).abs() < 1e-4);
        assert_eq!(material.base_color[1], 0.0);
        assert_eq!(material.metalness, 1.0);
    }

    #[test]
    fn test_normalize_recenters_and_clamps() {
        let mut model = load_model_from_slice(triangle_gltf().as_bytes(), "triangle").unwrap();
        model.normalize(2.1, [0.38, 0.52], [0.04, 0.12]);

        let bounds = model.bounds().unwrap();
        assert!(bounds.center().length() < 1e-5);
        assert!((bounds.max_extent() - 2.1).abs() < 1e-5);

        let part = &model.parts[0];
        assert!(part.casts_shadow);
        assert!(!part.receives_shadow);
        assert_eq!(part.material.roughness, 0.38);
        assert_eq!(part.material.metalness, 0.12);
    }

    #[test]
    fn test_provisioner_succeeds_with_file_source() {
        let path = std::env::temp_dir().join(format!("bean-viewer-{}.gltf", std::process::id()));
        std::fs::write(&path, triangle_gltf()).unwrap();

        let settings = ProvisionSettings {
            source: Some(path.display().to_string()),
            ..ProvisionSettings::default()
        };
        let mut provisioner = ModelProvisioner::start(&settings, PlaceholderSettings::default());

        let settlement = loop {
            if let Some(settlement) = provisioner.poll(0.0) {
                break settlement;
            }
            std::thread::yield_now();
        };
        std::fs::remove_file(&path).ok();

        assert_eq!(settlement.outcome, LoadOutcome::Succeeded);
        assert_eq!(settlement.asset.kind(), AssetKind::Loaded);
        let sphere = settlement.asset.bounding_sphere().unwrap();
        assert!(sphere.center.length() < 1e-4);
    }

    #[test]
    fn test_scene_without_triangles_is_rejected() {
        let json = r#"{ "asset": { "version": "2.0" }, "scenes": [{}] }"#;
        let err = load_model_from_slice(json.as_bytes(), "empty").unwrap_err();
        assert!(format!("{err:#}").contains("no triangle"));
    }

    #[test]
    fn test_unreachable_url_is_an_error() {
        assert!(load_model("http://127.0.0.1:9/bean.glb", None).is_err());
    }

    #[test]
    fn test_silent_server_is_cut_off_by_timeout() {
        // the kernel completes the handshake but nothing ever answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/bean.glb", listener.local_addr().unwrap());

        let started = Instant::now();
        let result = load_model(&url, Some(Duration::from_millis(200)));

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
