// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image dimensions via the image crate

use std::path::Path;

use super::{Dimensions, ImageDecoder};
use crate::Result;

/// Reads dimensions from the image header without decoding pixels
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl ImageDecoder for HeaderDecoder {
    fn dimensions(&self, path: &Path) -> Result<Dimensions> {
        Ok(::image::image_dimensions(path)?)
    }
}
