/*
 * Copyright © 2026, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fs, path::{Path, PathBuf}, time::Duration};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, config_error};

/// general clip pipeline configuration
#[derive(Clone,Serialize,Deserialize,Debug)]
#[serde(default)]
pub struct ClipConfig {
    /// parent directory of per-session output directories
    pub output_root: PathBuf,

    /// CRS of boundaries returned by the lookup (e.g. "EPSG:4326")
    pub aoi_crs: String,

    /// Nominatim search endpoint (e.g. https://nominatim.openstreetmap.org/search)
    pub nominatim_url: String,

    /// Nominatim requires an identifying user agent
    pub user_agent: String,

    pub lookup_timeout: Duration,

    /// DEFLATE compress written GeoTIFFs
    pub compress: bool,
}

impl Default for ClipConfig {
    fn default()->Self {
        ClipConfig {
            output_root: std::env::temp_dir().join("odin_clip"),
            aoi_crs: "EPSG:4326".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: format!("odin_clip/{}", env!("CARGO_PKG_VERSION")),
            lookup_timeout: Duration::from_secs(30),
            compress: true,
        }
    }
}

/// read a [`ClipConfig`] from a RON file. Missing fields are set to their defaults
pub fn load_config (path: impl AsRef<Path>)->Result<ClipConfig> {
    let path = path.as_ref();
    let input = fs::read_to_string( path)?;
    ron::from_str( input.as_str()).map_err( |e| config_error( format!("{path:?}: {e}")))
}
