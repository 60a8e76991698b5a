use image::RgbaImage;
use log::info;
use reqwest::Url;

use crate::config::Config;
use crate::download::{TileFetcher, fetch_all};
use crate::model::{SubRequest, TileConstraints};
use crate::planner::compute_requests;
use crate::query::build_query;
use crate::stitch::{TileGeometry, composite, new_canvas};
use crate::StatusOr;

/// A planned request together with the URL that fetches it
#[derive(Debug, Clone)]
pub struct PlannedTile {
    pub request: SubRequest,
    pub url: Url,
}

/// Builds a stitched map from a configuration
pub struct MapBuilder {
    config: Config,
    constraints: TileConstraints,
}

impl MapBuilder {
    pub fn new(config: Config, constraints: TileConstraints) -> Self {
        Self { config, constraints }
    }

    /// Plan every request and build its URL without fetching anything
    pub fn plan(&self) -> StatusOr<Vec<PlannedTile>> {
        let viewport = self.config.viewport();
        let requests = compute_requests(&viewport, &self.constraints)?;

        requests
            .into_iter()
            .map(|request| {
                let url = build_query(request.center, &viewport, &self.config.options, &self.constraints)?;
                Ok(PlannedTile { request, url })
            })
            .collect()
    }

    /// Fetch all tiles and stitch them into one image
    pub fn build<F: TileFetcher>(&self, fetcher: &F) -> StatusOr<RgbaImage> {
        let viewport = self.config.viewport();
        let planned = self.plan()?;
        info!(
            "Stitching a {}x{} map from {} requests",
            viewport.canvas_width(),
            viewport.canvas_height(),
            planned.len()
        );

        let urls: Vec<Url> = planned.iter().map(|tile| tile.url.clone()).collect();
        let tiles = fetch_all(fetcher, &urls)?;

        let mut canvas = new_canvas(&viewport);
        let geometry = TileGeometry::new(&self.constraints, viewport.scale);
        composite(
            &mut canvas,
            tiles.into_iter().zip(planned.iter().map(|tile| tile.request.placement)),
            &geometry,
        )?;

        Ok(canvas)
    }
}
