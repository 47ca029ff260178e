//! Datasets shipped with recset.

use super::{CifarDataset, DatasetRegistry, DetectionDataset, RecordIoDataset, VISION};
use crate::error::CoreResult;

const BASE_URL: &str = "https://s3.amazonaws.com/store.carml.org/datasets";

/// Registers the built-in vision datasets.
///
/// | key | adapter |
/// |---|---|
/// | `vision/ilsvrc2012_validation` | [`RecordIoDataset`] |
/// | `vision/ilsvrc2012_validation_224` | [`RecordIoDataset`] |
/// | `vision/ilsvrc2012_validation_227` | [`RecordIoDataset`] |
/// | `vision/pascal2007` | [`DetectionDataset`] |
/// | `vision/pascal2012` | [`DetectionDataset`] |
/// | `vision/coco2017` | [`DetectionDataset`] |
/// | `vision/cifar10` | [`CifarDataset`] |
/// | `vision/cifar100` | [`CifarDataset`] |
///
/// # Errors
///
/// Returns [`CoreError::InvalidOperation`](crate::CoreError::InvalidOperation)
/// if any of these keys is already registered.
pub fn register_builtin(registry: &mut DatasetRegistry) -> CoreResult<()> {
    registry.register(VISION, "ilsvrc2012_validation", |ctx| {
        Box::new(RecordIoDataset::ilsvrc2012_validation(ctx, None))
    })?;
    for size in [224, 227] {
        registry.register(VISION, &format!("ilsvrc2012_validation_{size}"), move |ctx| {
            Box::new(RecordIoDataset::ilsvrc2012_validation(ctx, Some(size)))
        })?;
    }

    for (name, dir) in [
        ("Pascal2007", "pascal2007"),
        ("Pascal2012", "pascal2012"),
        ("coco2017", "coco2017"),
    ] {
        registry.register(VISION, name, move |ctx| {
            Box::new(DetectionDataset::new(
                ctx,
                name,
                &format!("{BASE_URL}/{dir}"),
                "validation.tfrecord",
            ))
        })?;
    }

    registry.register(VISION, "cifar10", |ctx| Box::new(CifarDataset::cifar10(ctx)))?;
    registry.register(VISION, "cifar100", |ctx| Box::new(CifarDataset::cifar100(ctx)))?;
    Ok(())
}
