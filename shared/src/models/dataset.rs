//! Static catalog of the datasets the providers are queried for

use serde::Serialize;

/// Which provider serves a dataset
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Satellite,
    Imagery,
}

/// Query priority; lower tiers are only tried when higher ones yield nothing
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Primary,
    Secondary,
    Supplementary,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: ProviderKind,
    pub resolution: &'static str,
    pub update_frequency: &'static str,
    pub farming_use: &'static str,
    pub priority: PriorityTier,
}

pub const SMAP_SOIL_MOISTURE: &str = "smap-soil-moisture";
pub const MODIS_NDVI: &str = "modis-ndvi";
pub const GPM_PRECIPITATION: &str = "gpm-precipitation";
pub const MODIS_LST: &str = "modis-lst";
pub const SENTINEL_2_L2A: &str = "sentinel-2-l2a";
pub const LANDSAT_C2_L2: &str = "landsat-c2-l2";
pub const HLS_S30: &str = "hls2-s30";

const CATALOG: &[DatasetDescriptor] = &[
    DatasetDescriptor {
        id: SMAP_SOIL_MOISTURE,
        name: "SMAP Soil Moisture",
        provider: ProviderKind::Satellite,
        resolution: "9km",
        update_frequency: "daily",
        farming_use: "Irrigation scheduling and drought monitoring",
        priority: PriorityTier::Primary,
    },
    DatasetDescriptor {
        id: MODIS_NDVI,
        name: "MODIS Vegetation Index",
        provider: ProviderKind::Satellite,
        resolution: "250m",
        update_frequency: "16-day",
        farming_use: "Crop vigor and growth stage tracking",
        priority: PriorityTier::Primary,
    },
    DatasetDescriptor {
        id: GPM_PRECIPITATION,
        name: "GPM IMERG Precipitation",
        provider: ProviderKind::Satellite,
        resolution: "10km",
        update_frequency: "30-minute",
        farming_use: "Rainfall totals for planting and irrigation decisions",
        priority: PriorityTier::Secondary,
    },
    DatasetDescriptor {
        id: MODIS_LST,
        name: "MODIS Land Surface Temperature",
        provider: ProviderKind::Satellite,
        resolution: "1km",
        update_frequency: "daily",
        farming_use: "Heat stress and frost risk",
        priority: PriorityTier::Secondary,
    },
    DatasetDescriptor {
        id: SENTINEL_2_L2A,
        name: "Sentinel-2 Level-2A",
        provider: ProviderKind::Imagery,
        resolution: "10m",
        update_frequency: "5-day",
        farming_use: "Field-level vegetation health and crop mapping",
        priority: PriorityTier::Primary,
    },
    DatasetDescriptor {
        id: LANDSAT_C2_L2,
        name: "Landsat Collection 2 Level-2",
        provider: ProviderKind::Imagery,
        resolution: "30m",
        update_frequency: "16-day",
        farming_use: "Long-term field history and seasonal comparison",
        priority: PriorityTier::Secondary,
    },
    DatasetDescriptor {
        id: HLS_S30,
        name: "Harmonized Landsat Sentinel-2",
        provider: ProviderKind::Imagery,
        resolution: "30m",
        update_frequency: "2-3 day",
        farming_use: "Gap filling between Sentinel-2 and Landsat passes",
        priority: PriorityTier::Supplementary,
    },
];

/// All known datasets
pub fn dataset_catalog() -> &'static [DatasetDescriptor] {
    CATALOG
}

/// Look up a dataset by id
pub fn find_dataset(id: &str) -> Option<&'static DatasetDescriptor> {
    CATALOG.iter().find(|d| d.id == id)
}

/// Datasets served by one provider, highest priority first
pub fn datasets_for(provider: ProviderKind) -> Vec<&'static DatasetDescriptor> {
    let mut datasets: Vec<_> = CATALOG.iter().filter(|d| d.provider == provider).collect();
    datasets.sort_by_key(|d| d.priority);
    datasets
}
