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

use std::{path::PathBuf, process::ExitCode};
use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use odin_clip::{AoiClipper, BoundaryLookup, ClipConfig, NominatimLookup, StaticLookup, load_config};

/// clip_aoi - clip a georeferenced raster to the boundary of a named place
#[derive(Parser)]
#[command(version, about)]
struct CliOpts {
    /// RON file with ClipConfig to use (defaults otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// output GeoTIFF pathname (default is a new file in the session output dir)
    #[arg(short, long, default_value = "")]
    output: String,

    /// use this bounding box as the boundary instead of looking up the query
    #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values = true, value_names = ["WEST","SOUTH","EAST","NORTH"])]
    bbox: Option<Vec<f64>>,

    /// CRS of --bbox values (default is the configured AOI CRS)
    #[arg(long)]
    bbox_crs: Option<String>,

    /// place to clip to
    query: String,

    /// pathname of raster to clip
    raster: PathBuf
}

fn main ()->ExitCode {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();
    let opts = CliOpts::parse();

    match run( &opts) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("clip failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run (opts: &CliOpts)->Result<PathBuf> {
    let config = match &opts.config {
        Some(path) => load_config( path)?,
        None => ClipConfig::default()
    };

    if let Some([west, south, east, north]) = opts.bbox.as_deref() {
        let crs = opts.bbox_crs.clone().unwrap_or_else( || config.aoi_crs.clone());
        clip_with( StaticLookup::from_bbox( *west, *south, *east, *north, crs), config, opts)
    } else {
        let lookup = NominatimLookup::new( &config)?;
        clip_with( lookup, config, opts)
    }
}

fn clip_with<L: BoundaryLookup> (lookup: L, config: ClipConfig, opts: &CliOpts)->Result<PathBuf> {
    let clipper = AoiClipper::new( lookup, config)?;
    Ok( clipper.clip( &opts.query, &opts.raster, &opts.output)? )
}
