//! Stereolithography (STL) triangle soups, ASCII and binary.
//!
//! Every facet is welded into an indexed [`Mesh`] as it is read.
use super::*;
use std::{fmt, path::Path};

/// Anything shorter cannot hold a single facet in either encoding.
const MIN_LEN: usize = 15;
const HEADER_LEN: usize = 80;
/// The header plus the little endian facet count.
const PREAMBLE_LEN: usize = 84;
/// normal + 3 vertices (12 `f32`s) + 2 byte attribute.
const RECORD_LEN: usize = 50;
/// Written binary headers must not start with `solid `.
const BINARY_HEADER: &[u8] = b"binary stl written by stlmesh";

/// The encoding of an STL buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
    /// Neither check passed, the buffer will not be parsed.
    Invalid,
}

/// Determine the encoding of `bytes`.
///
/// - **ASCII**: the buffer starts with `solid ` and the last non-blank line starts with
///   `endsolid` (case insensitive).
/// - **Binary**: the buffer is exactly `84 + 50 × N` bytes long, where `N` is the little endian
///   `u32` at offset 80.
///
/// The ASCII check runs first, since binary headers may also start with `solid `.
/// Buffers shorter than 15 bytes are always invalid.
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    if bytes.len() < MIN_LEN {
        StlFormat::Invalid
    } else if is_ascii_stl(bytes) {
        StlFormat::Ascii
    } else if matches!(binary_len(bytes), Some((_, exp)) if exp == bytes.len() as u64) {
        StlFormat::Binary
    } else {
        StlFormat::Invalid
    }
}

fn is_ascii_stl(bytes: &[u8]) -> bool {
    fn trim_start(l: &[u8]) -> &[u8] {
        let i = l
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(l.len());
        &l[i..]
    }

    bytes.starts_with(b"solid ")
        && bytes
            .rsplit(|&b| b == b'\n')
            .map(trim_start)
            .find(|l| !l.is_empty())
            .map_or(false, |l| {
                l.get(..8)
                    .map_or(false, |k| k.eq_ignore_ascii_case(b"endsolid"))
            })
}

/// The facet count and the byte length it implies.
fn binary_len(bytes: &[u8]) -> Option<(u32, u64)> {
    let n = bytes.get(HEADER_LEN..PREAMBLE_LEN).map(LE::read_u32)?;
    Some((n, PREAMBLE_LEN as u64 + RECORD_LEN as u64 * n as u64))
}

/// Parse `bytes` as `format`, welding with the default [`WELD_TOLERANCE`].
///
/// No partial mesh is ever returned.
///
/// # Errors
/// - [`Error::UnrecognizedFormat`] for [`StlFormat::Invalid`], or a binary buffer which is
///   _longer_ than its facet count implies.
/// - [`Error::MalformedRecord`] for an ASCII line which cannot be parsed or is out of place
///   (1-based line number), or a binary buffer which ends mid record (0-based facet index).
pub fn parse(bytes: &[u8], format: StlFormat) -> Result<Mesh> {
    parse_with_tolerance(bytes, format, WELD_TOLERANCE)
}

/// Parse `bytes` as `format`, welding points within `tolerance` on every axis.
///
/// See [`parse`].
pub fn parse_with_tolerance(bytes: &[u8], format: StlFormat, tolerance: f64) -> Result<Mesh> {
    let tris = match format {
        StlFormat::Ascii => parse_ascii(bytes)?,
        StlFormat::Binary => parse_binary(bytes)?,
        StlFormat::Invalid => {
            return Err(Error::unrecognized(
                "buffer is neither ascii nor binary stl",
            ))
        }
    };

    let facets = tris.len();
    let mut mesh = Mesh::default();
    mesh.extend_with_tolerance(tris.into_iter(), tolerance);

    log::debug!(
        "parsed {:?} stl: {} facets welded into {} points",
        format,
        facets,
        mesh.point_len()
    );

    Ok(mesh)
}

/// Detect the format of `bytes` and parse it.
pub fn from_stl(bytes: &[u8]) -> Result<Mesh> {
    parse(bytes, detect_format(bytes))
}

/// Read an STL file from disk.
///
/// # Errors
/// [`Error::UnreadableInput`] if the file cannot be read, otherwise see [`parse`].
pub fn read_stl<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let bytes = std::fs::read(path)?;
    from_stl(&bytes)
}

// ###### BINARY ###############################################################

fn parse_binary(bytes: &[u8]) -> Result<Vec<Tri>> {
    let (n, expected) = binary_len(bytes).ok_or_else(|| {
        Error::unrecognized(format!(
            "binary stl needs a {} byte preamble, found {} bytes",
            PREAMBLE_LEN,
            bytes.len()
        ))
    })?;

    let len = bytes.len() as u64;
    if len > expected {
        return Err(Error::unrecognized(format!(
            "{len} bytes is more than the {expected} bytes expected for {n} facets"
        )));
    }

    let mut c = Cursor::new(bytes);
    c.set_position(PREAMBLE_LEN as u64);

    let cap = (n as usize).min((bytes.len() - PREAMBLE_LEN) / RECORD_LEN + 1);
    let mut tris = Vec::with_capacity(cap);
    for i in 0..n as usize {
        let tri = read_facet(&mut c)
            .map_err(|_| Error::malformed(i, "binary stream truncated mid record"))?;
        if !tri.iter().flatten().all(|x| x.is_finite()) {
            return Err(Error::malformed(i, "non-finite vertex coordinate"));
        }
        tris.push(tri);
    }

    Ok(tris)
}

fn read_point(c: &mut Cursor<&[u8]>) -> std::io::Result<Point3> {
    let x = c.read_f32::<LE>()?;
    let y = c.read_f32::<LE>()?;
    let z = c.read_f32::<LE>()?;
    Ok([x as f64, y as f64, z as f64])
}

fn read_facet(c: &mut Cursor<&[u8]>) -> std::io::Result<Tri> {
    read_point(c)?; // normal, the winding is what counts
    let tri = [read_point(c)?, read_point(c)?, read_point(c)?];
    c.read_u16::<LE>()?; // attribute byte count
    Ok(tri)
}

/// Serialize a mesh as binary STL.
///
/// Normals are recomputed from the winding; degenerate facets get a zero normal.
pub fn to_stl_binary(mesh: &Mesh) -> Vec<u8> {
    fn ser(mesh: &Mesh) -> std::io::Result<Vec<u8>> {
        let mut wtr = Vec::with_capacity(PREAMBLE_LEN + RECORD_LEN * mesh.tri_len());

        let mut header = [0x00; HEADER_LEN];
        header[..BINARY_HEADER.len()].copy_from_slice(BINARY_HEADER);
        wtr.write_all(&header)?;
        wtr.write_u32::<LE>(mesh.tri_len() as u32)?;

        for tri in mesh.tris() {
            let n = raw_normal(tri).try_unit().unwrap_or_default();
            for p in std::iter::once(n).chain(tri) {
                for x in p {
                    wtr.write_f32::<LE>(x as f32)?;
                }
            }
            wtr.write_u16::<LE>(0)?;
        }

        Ok(wtr)
    }

    ser(mesh).expect("serialization should not fail since writing to a memory buffer")
}

// ###### ASCII ################################################################

#[derive(Debug, Clone, PartialEq)]
enum Record<'a> {
    Solid(&'a str),
    Facet(Point3),
    OuterLoop,
    Vertex(Point3),
    EndLoop,
    EndFacet,
    EndSolid(&'a str),
}

/// What the reader expects next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    Solid,
    Facet,
    OuterLoop,
    Vertex(usize),
    EndLoop,
    EndFacet,
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Expect::Solid => "`solid`",
            Expect::Facet => "`facet normal` or `endsolid`",
            Expect::OuterLoop => "`outer loop`",
            Expect::Vertex(_) => "`vertex x y z`",
            Expect::EndLoop => "`endloop`",
            Expect::EndFacet => "`endfacet`",
        };
        f.write_str(s)
    }
}

/// Parse a single trimmed line.
fn record(line: &str) -> Option<Record<'_>> {
    use nom::{
        branch::alt,
        bytes::complete::tag_no_case,
        character::complete::space1,
        combinator::{all_consuming, map, opt, rest, value, verify},
        number::complete::double,
        sequence::{preceded, tuple},
        IResult,
    };

    // `double` also takes `nan` and `inf`
    fn n(i: &str) -> IResult<&str, f64, ()> {
        preceded(space1, verify(double, |x: &f64| x.is_finite()))(i)
    }
    fn xyz(i: &str) -> IResult<&str, Point3, ()> {
        map(tuple((n, n, n)), |(x, y, z)| [x, y, z])(i)
    }
    fn name(i: &str) -> IResult<&str, &str, ()> {
        map(opt(preceded(space1, rest)), Option::unwrap_or_default)(i)
    }

    let r: IResult<&str, Record, ()> = all_consuming(alt((
        map(preceded(tag_no_case("solid"), name), Record::Solid),
        map(
            preceded(
                tuple((tag_no_case("facet"), space1, tag_no_case("normal"))),
                xyz,
            ),
            Record::Facet,
        ),
        value(
            Record::OuterLoop,
            tuple((tag_no_case("outer"), space1, tag_no_case("loop"))),
        ),
        map(preceded(tag_no_case("vertex"), xyz), Record::Vertex),
        value(Record::EndLoop, tag_no_case("endloop")),
        value(Record::EndFacet, tag_no_case("endfacet")),
        map(preceded(tag_no_case("endsolid"), name), Record::EndSolid),
    )))(line);

    r.ok().map(|(_, r)| r)
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<Tri>> {
    let mut tris = Vec::new();
    let mut facet = [[0.0; 3]; 3];
    let mut expect = Expect::Solid;
    let mut solids = 0;
    let mut solid_start = 0;
    let mut last = 0;

    // decoded per line, solid names are free text and may not be utf8
    for (i, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim();
        if line.is_empty() {
            continue;
        }
        let no = i + 1;
        last = no;
        let rec = record(line).ok_or_else(|| Error::malformed(no, format!("cannot parse `{line}`")))?;

        expect = match (expect, rec) {
            (Expect::Solid, Record::Solid(name)) => {
                log::debug!("reading ascii solid `{}`", name);
                solids += 1;
                solid_start = tris.len();
                Expect::Facet
            }
            (Expect::Facet, Record::Facet(_)) => Expect::OuterLoop,
            (Expect::Facet, Record::EndSolid(name)) => {
                if tris.len() == solid_start {
                    log::warn!("ascii solid `{}` has no facets", name);
                }
                Expect::Solid
            }
            (Expect::OuterLoop, Record::OuterLoop) => Expect::Vertex(0),
            (Expect::Vertex(i), Record::Vertex(p)) => {
                facet[i] = p;
                if i == 2 {
                    Expect::EndLoop
                } else {
                    Expect::Vertex(i + 1)
                }
            }
            (Expect::EndLoop, Record::EndLoop) => Expect::EndFacet,
            (Expect::EndFacet, Record::EndFacet) => {
                tris.push(facet);
                Expect::Facet
            }
            (e, _) => {
                return Err(Error::malformed(
                    no,
                    format!("expecting {e}, found `{line}`"),
                ))
            }
        };
    }

    if expect != Expect::Solid || solids == 0 {
        return Err(Error::malformed(
            last + 1,
            format!("unexpected end of file, expecting {expect}"),
        ));
    }

    Ok(tris)
}

/// Serialize a mesh as ASCII STL, with the solid called `name`.
///
/// Coordinates are written with full `f64` precision. Normals are recomputed from the winding;
/// degenerate facets get a zero normal.
pub fn to_stl_ascii(name: &str, mesh: &Mesh) -> Vec<u8> {
    fn ser(name: &str, mesh: &Mesh) -> std::io::Result<Vec<u8>> {
        let mut wtr = Vec::new();
        writeln!(wtr, "solid {name}")?;
        for tri in mesh.tris() {
            let [nx, ny, nz] = raw_normal(tri).try_unit().unwrap_or_default();
            writeln!(wtr, "  facet normal {nx} {ny} {nz}")?;
            writeln!(wtr, "    outer loop")?;
            for [x, y, z] in tri {
                writeln!(wtr, "      vertex {x} {y} {z}")?;
            }
            writeln!(wtr, "    endloop")?;
            writeln!(wtr, "  endfacet")?;
        }
        writeln!(wtr, "endsolid {name}")?;
        Ok(wtr)
    }

    let name = name.lines().next().unwrap_or_default().trim();
    ser(name, mesh).expect("serialization should not fail since writing to a memory buffer")
}
