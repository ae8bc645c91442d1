//! Wavefront OBJ geometry
//!
//! Only positions and faces are read. Each `o` or `g` statement starts a
//! new mesh; polygons are triangulated as fans.

use crate::assets::ContentError;
use crate::foundation::math::Vec3;
use crate::render::{Mesh, Model};

/// Parse OBJ text into a model named `name`
pub fn parse_obj(name: &str, bytes: &[u8]) -> Result<Model, ContentError> {
    let text = std::str::from_utf8(bytes).map_err(|error| parse_error(name, 0, &error.to_string()))?;

    let mut positions: Vec<Vec3> = Vec::new();
    let mut meshes: Vec<Mesh> = Vec::new();
    let mut current = Mesh::default();
    // Global position index -> index within the current mesh
    let mut remap: Vec<Option<u32>> = Vec::new();

    for (line_number, line) in text.lines().enumerate() {
        let line_number = line_number + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coords = [0.0_f32; 3];
                for coord in &mut coords {
                    *coord = parts
                        .next()
                        .ok_or_else(|| parse_error(name, line_number, "vertex needs three coordinates"))?
                        .parse()
                        .map_err(|_| parse_error(name, line_number, "invalid vertex coordinate"))?;
                }
                positions.push(Vec3::new(coords[0], coords[1], coords[2]));
                remap.push(None);
            }
            Some("o" | "g") => {
                if !current.indices.is_empty() {
                    meshes.push(std::mem::take(&mut current));
                    remap.iter_mut().for_each(|slot| *slot = None);
                }
            }
            Some("f") => {
                let mut face = Vec::new();
                for vertex in parts {
                    let global = resolve_index(vertex, positions.len())
                        .ok_or_else(|| parse_error(name, line_number, "invalid face index"))?;
                    let local = match remap[global] {
                        Some(local) => local,
                        None => {
                            let local = u32::try_from(current.positions.len())
                                .map_err(|_| parse_error(name, line_number, "too many vertices"))?;
                            current.positions.push(positions[global]);
                            remap[global] = Some(local);
                            local
                        }
                    };
                    face.push(local);
                }
                if face.len() < 3 {
                    return Err(parse_error(name, line_number, "face needs at least three vertices"));
                }
                for i in 1..face.len() - 1 {
                    current.indices.extend([face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if !current.indices.is_empty() {
        meshes.push(current);
    }
    Ok(Model::new(name, meshes))
}

/// 1-based or negative (relative) OBJ index to a 0-based index
fn resolve_index(vertex: &str, count: usize) -> Option<usize> {
    let index: i64 = vertex.split('/').next()?.parse().ok()?;
    let count = i64::try_from(count).ok()?;
    let resolved = if index < 0 { count + index } else { index - 1 };
    if (0..count).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

fn parse_error(name: &str, line: usize, message: &str) -> ContentError {
    ContentError::Parse {
        name: name.to_string(),
        message: format!("line {line}: {message}"),
    }
}
