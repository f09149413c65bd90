//! Gmsh mesh files
//!
//! ASCII files in the 2.2 and 4.1 formats can be read. Node tags are mapped to positions in the
//! point list, and the z coordinate is dropped. Consecutive elements of the same type are put
//! into one [CellBlock], so cells keep the order they have in the file.

use crate::grid::{CellBlock, RawMesh};
use crate::traits::MeshSource;
use crate::types::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Name of a Gmsh element type
fn element_name(element_type: usize) -> String {
    match element_type {
        15 => String::from("vertex"),
        1 => String::from("line"),
        2 => String::from("triangle"),
        3 => String::from("quad"),
        4 => String::from("tetra"),
        _ => format!("gmsh:{element_type}"),
    }
}

/// Reader for Gmsh `.msh` files
#[derive(Debug, Clone)]
pub struct GmshReader {
    path: PathBuf,
}

impl GmshReader {
    /// Create a reader for the file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a mesh from a reader
    pub fn parse<R: BufRead>(reader: R) -> Result<RawMesh> {
        let mut lines = Lines::new(reader);
        let mut version = None;
        let mut node_map = HashMap::new();
        let mut raw = RawMesh::default();

        while let Some(line) = lines.next_line()? {
            match line.trim() {
                "$MeshFormat" => {
                    let format = lines.expect_line("mesh format")?;
                    version = Some(parse_format(&format, lines.number)?);
                    lines.skip_to("$EndMeshFormat")?;
                }
                "$Nodes" => {
                    let (points, map) = match version {
                        Some(4) => parse_nodes_v4(&mut lines)?,
                        Some(_) => parse_nodes_v2(&mut lines)?,
                        None => return Err(lines.error("$Nodes before $MeshFormat")),
                    };
                    raw.points = points;
                    node_map = map;
                }
                "$Elements" => {
                    raw.blocks = match version {
                        Some(4) => parse_elements_v4(&mut lines, &node_map)?,
                        Some(_) => parse_elements_v2(&mut lines, &node_map)?,
                        None => return Err(lines.error("$Elements before $MeshFormat")),
                    };
                }
                section if section.starts_with('$') => {
                    lines.skip_to(&format!("$End{}", &section[1..]))?;
                }
                _ => {}
            }
        }

        if version.is_none() {
            return Err(lines.error("missing $MeshFormat section"));
        }
        debug!(
            "Read {} nodes and {} element blocks",
            raw.points.len(),
            raw.blocks.len()
        );
        Ok(raw)
    }
}

impl MeshSource for GmshReader {
    fn read_raw(&self) -> Result<RawMesh> {
        let file = File::open(&self.path)?;
        Self::parse(BufReader::new(file))
    }
}

/// Lines of a file with the number of the last line read
struct Lines<R: BufRead> {
    inner: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.inner.next() {
            Some(line) => {
                self.number += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| self.error(&format!("unexpected end of file, expected {what}")))
    }

    fn skip_to(&mut self, end: &str) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if line.trim() == end {
                return Ok(());
            }
        }
        Err(self.error(&format!("missing {end}")))
    }

    fn error(&self, message: &str) -> Error {
        Error::MeshFormat {
            line: self.number,
            message: message.to_string(),
        }
    }

    /// Read a line and parse every whitespace separated value
    fn expect_values<T: std::str::FromStr>(&mut self, what: &str) -> Result<Vec<T>> {
        let line = self.expect_line(what)?;
        line.split_whitespace()
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| self.error(&format!("invalid value {v:?} in {what}")))
            })
            .collect()
    }
}

fn parse_format(line: &str, number: usize) -> Result<u32> {
    let error = |message: String| Error::MeshFormat {
        line: number,
        message,
    };
    let mut parts = line.split_whitespace();
    let version = parts
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| error(format!("invalid mesh format {line:?}")))?;
    if parts.next() != Some("0") {
        return Err(error(String::from("only ASCII files can be read")));
    }
    match version.floor() as u32 {
        v @ (2 | 4) => Ok(v),
        v => Err(error(format!("unsupported format version {v}"))),
    }
}

type Nodes = (Vec<[f64; 2]>, HashMap<usize, usize>);

fn parse_nodes_v2<R: BufRead>(lines: &mut Lines<R>) -> Result<Nodes> {
    let count = lines.expect_values::<usize>("node count")?;
    let n = *count
        .first()
        .ok_or_else(|| lines.error("missing node count"))?;
    let mut points = Vec::with_capacity(n);
    let mut map = HashMap::with_capacity(n);
    for _ in 0..n {
        let line = lines.expect_line("node")?;
        let parts = line.split_whitespace().collect::<Vec<_>>();
        if parts.len() < 3 {
            return Err(lines.error("expected <tag> <x> <y> [<z>]"));
        }
        let tag = parts[0]
            .parse::<usize>()
            .map_err(|_| lines.error("invalid node tag"))?;
        let x = parts[1]
            .parse::<f64>()
            .map_err(|_| lines.error("invalid x coordinate"))?;
        let y = parts[2]
            .parse::<f64>()
            .map_err(|_| lines.error("invalid y coordinate"))?;
        map.insert(tag, points.len());
        points.push([x, y]);
    }
    lines.skip_to("$EndNodes")?;
    Ok((points, map))
}

fn parse_nodes_v4<R: BufRead>(lines: &mut Lines<R>) -> Result<Nodes> {
    let header = lines.expect_values::<usize>("node header")?;
    if header.len() < 4 {
        return Err(lines.error("expected <blocks> <nodes> <min tag> <max tag>"));
    }
    let (nblocks, n) = (header[0], header[1]);
    let mut points = Vec::with_capacity(n);
    let mut map = HashMap::with_capacity(n);
    for _ in 0..nblocks {
        let block = lines.expect_values::<usize>("node block header")?;
        if block.len() < 4 {
            return Err(lines.error("expected <dim> <entity> <parametric> <nodes>"));
        }
        let nnodes = block[3];
        let mut tags = Vec::with_capacity(nnodes);
        for _ in 0..nnodes {
            let tag = lines.expect_values::<usize>("node tag")?;
            tags.push(*tag.first().ok_or_else(|| lines.error("missing node tag"))?);
        }
        for tag in tags {
            let coords = lines.expect_values::<f64>("node coordinates")?;
            if coords.len() < 2 {
                return Err(lines.error("expected <x> <y> <z>"));
            }
            map.insert(tag, points.len());
            points.push([coords[0], coords[1]]);
        }
    }
    lines.skip_to("$EndNodes")?;
    Ok((points, map))
}

/// Append an element to the last block, or start a new block if the type changes
fn push_element(blocks: &mut Vec<CellBlock>, element_type: usize, nodes: Vec<usize>) {
    let name = element_name(element_type);
    match blocks.last_mut() {
        Some(block) if block.kind_name == name => block.connectivity.push(nodes),
        _ => blocks.push(CellBlock {
            kind_name: name,
            connectivity: vec![nodes],
        }),
    }
}

fn map_nodes<R: BufRead>(
    lines: &Lines<R>,
    tags: &[usize],
    node_map: &HashMap<usize, usize>,
) -> Result<Vec<usize>> {
    tags.iter()
        .map(|t| {
            node_map
                .get(t)
                .copied()
                .ok_or_else(|| lines.error(&format!("unknown node tag {t}")))
        })
        .collect()
}

fn parse_elements_v2<R: BufRead>(
    lines: &mut Lines<R>,
    node_map: &HashMap<usize, usize>,
) -> Result<Vec<CellBlock>> {
    let count = lines.expect_values::<usize>("element count")?;
    let n = *count
        .first()
        .ok_or_else(|| lines.error("missing element count"))?;
    let mut blocks = vec![];
    for _ in 0..n {
        let element = lines.expect_values::<usize>("element")?;
        if element.len() < 3 || element.len() < 3 + element[2] {
            return Err(lines.error("expected <tag> <type> <ntags> <tags...> <nodes...>"));
        }
        let nodes = map_nodes(lines, &element[3 + element[2]..], node_map)?;
        push_element(&mut blocks, element[1], nodes);
    }
    lines.skip_to("$EndElements")?;
    Ok(blocks)
}

fn parse_elements_v4<R: BufRead>(
    lines: &mut Lines<R>,
    node_map: &HashMap<usize, usize>,
) -> Result<Vec<CellBlock>> {
    let header = lines.expect_values::<usize>("element header")?;
    if header.len() < 4 {
        return Err(lines.error("expected <blocks> <elements> <min tag> <max tag>"));
    }
    let mut blocks = vec![];
    for _ in 0..header[0] {
        let block = lines.expect_values::<usize>("element block header")?;
        if block.len() < 4 {
            return Err(lines.error("expected <dim> <entity> <type> <elements>"));
        }
        let (element_type, nelements) = (block[2], block[3]);
        for _ in 0..nelements {
            let element = lines.expect_values::<usize>("element")?;
            if element.is_empty() {
                return Err(lines.error("expected <tag> <nodes...>"));
            }
            let nodes = map_nodes(lines, &element[1..], node_map)?;
            push_element(&mut blocks, element_type, nodes);
        }
    }
    lines.skip_to("$EndElements")?;
    Ok(blocks)
}
