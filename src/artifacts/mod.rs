use crate::algorithms::{BiasedMf, CsrMatrix, LatentFactorModel};
use crate::engine::IdRegistry;
use crate::models::{ItemId, ItemMetadata, UserId};
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

pub const RETRIEVAL_FILE: &str = "retrieval.json";
pub const RANKING_FILE: &str = "ranking.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const POPULARITY_FILE: &str = "popularity.json";

/// Everything the engine consumes, loaded once at startup.
///
/// Retrieval and ranking artifacts are mandatory; metadata and popularity
/// are optional and their absence only degrades enrichment and the
/// fallback, never the personalized path.
pub struct Artifacts {
    pub registry: IdRegistry,
    pub retrieval: LatentFactorModel,
    pub interactions: CsrMatrix,
    pub ranking: BiasedMf,
    pub metadata: Option<HashMap<ItemId, ItemMetadata>>,
    pub popularity: Option<Vec<ItemId>>,
}

#[derive(Debug, Deserialize)]
struct RetrievalFile {
    user_ids: Vec<u64>,
    item_ids: Vec<u64>,
    user_factors: Vec<Vec<f32>>,
    item_factors: Vec<Vec<f32>>,
    interactions: CsrFile,
}

#[derive(Debug, Deserialize)]
struct CsrFile {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct RankingFile {
    global_mean: f32,
    #[serde(default = "default_rating_min")]
    rating_min: f32,
    #[serde(default = "default_rating_max")]
    rating_max: f32,
    #[serde(default)]
    user_bias: HashMap<u64, f32>,
    #[serde(default)]
    item_bias: HashMap<u64, f32>,
    #[serde(default)]
    user_factors: HashMap<u64, Vec<f32>>,
    #[serde(default)]
    item_factors: HashMap<u64, Vec<f32>>,
}

fn default_rating_min() -> f32 {
    1.0
}

fn default_rating_max() -> f32 {
    5.0
}

#[derive(Debug, Deserialize)]
struct MetadataRow {
    item_id: u64,
    title: String,
    genres: Vec<String>,
}

impl Artifacts {
    /// Load all artifacts from `dir`. Fails on missing or malformed
    /// mandatory artifacts; optional ones degrade with a warning.
    pub fn load(dir: &Path) -> Result<Self> {
        info!("loading model artifacts from {}", dir.display());

        let retrieval_file: RetrievalFile = read_json(&dir.join(RETRIEVAL_FILE))
            .context("failed to load retrieval artifacts")?;
        let (registry, retrieval, interactions) = build_retrieval(retrieval_file)?;

        let ranking_file: RankingFile =
            read_json(&dir.join(RANKING_FILE)).context("failed to load ranking artifacts")?;
        let ranking = build_ranking(ranking_file);

        let metadata = load_optional(&dir.join(METADATA_FILE), |rows: Vec<MetadataRow>| {
            rows.into_iter()
                .map(|row| {
                    (
                        ItemId(row.item_id),
                        ItemMetadata {
                            title: row.title,
                            genres: row.genres,
                        },
                    )
                })
                .collect::<HashMap<_, _>>()
        });

        let popularity = load_optional(&dir.join(POPULARITY_FILE), |ids: Vec<u64>| {
            ids.into_iter().map(ItemId).collect::<Vec<_>>()
        });

        info!(
            users = registry.num_users(),
            items = registry.num_items(),
            metadata = metadata.is_some(),
            popularity = popularity.is_some(),
            "artifacts loaded"
        );

        Ok(Self {
            registry,
            retrieval,
            interactions,
            ranking,
            metadata,
            popularity,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Optional collaborator data: absence or corruption is degraded mode, not
/// a startup failure.
fn load_optional<T, R>(path: &Path, convert: impl FnOnce(T) -> R) -> Option<R>
where
    T: serde::de::DeserializeOwned,
{
    match read_json::<T>(path) {
        Ok(raw) => Some(convert(raw)),
        Err(e) => {
            warn!("optional artifact {} unavailable: {e:#}", path.display());
            None
        }
    }
}

fn build_retrieval(file: RetrievalFile) -> Result<(IdRegistry, LatentFactorModel, CsrMatrix)> {
    if file.user_ids.len() != file.user_factors.len() {
        bail!(
            "user id table has {} entries but user factor matrix has {} rows",
            file.user_ids.len(),
            file.user_factors.len()
        );
    }
    if file.item_ids.len() != file.item_factors.len() {
        bail!(
            "item id table has {} entries but item factor matrix has {} rows",
            file.item_ids.len(),
            file.item_factors.len()
        );
    }

    let user_factors = to_array2(file.user_factors).context("malformed user factor matrix")?;
    let item_factors = to_array2(file.item_factors).context("malformed item factor matrix")?;
    let model = LatentFactorModel::new(user_factors, item_factors)
        .context("inconsistent retrieval factor matrices")?;

    let interactions = CsrMatrix::new(
        file.interactions.indptr,
        file.interactions.indices,
        file.interactions.data,
        file.item_ids.len(),
    )
    .context("malformed interaction matrix")?;
    if interactions.rows() != file.user_ids.len() {
        bail!(
            "interaction matrix has {} rows but id table has {} users",
            interactions.rows(),
            file.user_ids.len()
        );
    }

    let user_ids: Vec<UserId> = file.user_ids.into_iter().map(UserId).collect();
    let item_ids: Vec<ItemId> = file.item_ids.into_iter().map(ItemId).collect();
    let registry = IdRegistry::new(&user_ids, &item_ids);

    Ok((registry, model, interactions))
}

fn build_ranking(file: RankingFile) -> BiasedMf {
    BiasedMf::new(
        file.global_mean,
        file.rating_min,
        file.rating_max,
        file.user_bias.into_iter().map(|(k, v)| (UserId(k), v)).collect(),
        file.item_bias.into_iter().map(|(k, v)| (ItemId(k), v)).collect(),
        file.user_factors
            .into_iter()
            .map(|(k, v)| (UserId(k), v))
            .collect(),
        file.item_factors
            .into_iter()
            .map(|(k, v)| (ItemId(k), v))
            .collect(),
    )
}

fn to_array2(rows: Vec<Vec<f32>>) -> Result<Array2<f32>> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        bail!(
            "ragged factor matrix: expected {} columns, found a row with {}",
            ncols,
            bad.len()
        );
    }
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((nrows, ncols), flat)?)
}
