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

use anyhow::Result;
use clap::Parser;
use geo::CoordsIter;
use odin_gdal::{RasterSource, gdal::Metadata};

/// raster_meta - show grid shape, georeferencing and footprint of a GDAL raster
#[derive(Parser)]
#[command(version, about)]
struct CliOpts {
    /// also list band descriptions and metadata domains
    #[arg(long)]
    verbose: bool,

    /// path of raster to analyze
    path: String
}

fn main ()->Result<()> {
    let opts = CliOpts::parse();
    let src = RasterSource::open( &opts.path)?;
    let meta = src.meta();

    println!("raster size:  {} x {} ({} bands)", meta.width, meta.height, meta.band_count);
    println!("element type: {:?}", meta.element_type);
    println!("crs:          {}", meta.crs);
    println!("transform:    {:?}", meta.transform.to_gdal());
    println!("nodata:       {:?}", meta.nodata);

    print!("bounds:      ");
    for c in meta.bounds_polygon().exterior_coords_iter() {
        print!(" ({:.4},{:.4})", c.x, c.y);
    }
    println!();

    if opts.verbose {
        let ds = src.dataset();
        for band_id in 1..=meta.band_count {
            let band = ds.rasterband( band_id)?;
            println!("--- band {band_id}: {:?}", band.band_type());
            if let Ok(descr) = band.description() {
                if !descr.is_empty() { println!("    description: {descr}"); }
            }
            for domain in band.metadata_domains() {
                if let Some(items) = band.metadata_domain( &domain) {
                    for item in &items {
                        println!("    {domain}: {item}");
                    }
                }
            }
        }
    }

    src.release();
    Ok(())
}
