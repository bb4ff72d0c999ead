//! Mesh file formats.
//! Adds functionality for data interop and conversion.
use crate::*;
use byteorder::*;
use std::io::{Cursor, Write};

pub mod stl;
