//! YOLO to COCO conversion pipeline.
//!
//! The pipeline loads the class list, discovers images, splits them into
//! train/val, and converts each split in turn with a fresh
//! [`DatasetBuilder`]. Processing is strictly sequential: ids depend on
//! processing order.
//!
//! Output layout:
//!
//! ```text
//! <output>/train/images/<file names>
//! <output>/train/annotations/instances_train.json
//! <output>/val/images/<file names>
//! <output>/val/annotations/instances_val.json
//! ```
//!
//! Image measurement and file copying go through the [`ImageProbe`] and
//! [`FileCopier`] traits so tests can substitute them.

pub mod builder;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub use builder::{BuiltSplit, DatasetBuilder};
pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, SplitSummary,
};

use crate::error::Yolo2CocoError;
use crate::ir::io_coco_json::write_coco_json;
use crate::ir::io_yolo::{collect_image_files, label_path_for_image, read_label_file};
use crate::ir::{CategoryRecord, ClassList};
use crate::progress::create_progress_bar;
use crate::split::{split_train_val, validate_train_ratio, DEFAULT_SEED, DEFAULT_TRAIN_RATIO};

/// Which partition is being processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    Train,
    Val,
}

impl SplitKind {
    pub fn name(&self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Val => "val",
        }
    }
}

/// Measures an image without decoding pixel data where possible.
pub trait ImageProbe {
    /// Returns `(width, height)` in pixels.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), Yolo2CocoError>;
}

/// Reads dimensions from the image header via `imagesize`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImagesizeProbe;

impl ImageProbe for ImagesizeProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), Yolo2CocoError> {
        let size = imagesize::size(path).map_err(|source| Yolo2CocoError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;

        let width: u32 = size
            .width
            .try_into()
            .map_err(|_| Yolo2CocoError::ImageProbe {
                path: path.to_path_buf(),
                message: format!("image width {} does not fit in u32", size.width),
            })?;

        let height: u32 = size
            .height
            .try_into()
            .map_err(|_| Yolo2CocoError::ImageProbe {
                path: path.to_path_buf(),
                message: format!("image height {} does not fit in u32", size.height),
            })?;

        Ok((width, height))
    }
}

/// Copies a source image into the output tree.
pub trait FileCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<(), Yolo2CocoError>;
}

/// Plain filesystem copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<(), Yolo2CocoError> {
        fs::copy(from, to).map(|_| ()).map_err(Yolo2CocoError::Io)
    }
}

/// Inputs of a conversion run.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub label_list: PathBuf,
    pub output_dir: PathBuf,
    pub train_ratio: f64,
    pub seed: u64,
}

impl ConvertOptions {
    /// Options with the default ratio (0.9) and seed (42).
    pub fn new(
        images_dir: impl Into<PathBuf>,
        labels_dir: impl Into<PathBuf>,
        label_list: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            labels_dir: labels_dir.into(),
            label_list: label_list.into(),
            output_dir: output_dir.into(),
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: DEFAULT_SEED,
        }
    }
}

/// Fixed output directory layout.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images_dir(&self, split: SplitKind) -> PathBuf {
        self.root.join(split.name()).join("images")
    }

    pub fn annotations_dir(&self, split: SplitKind) -> PathBuf {
        self.root.join(split.name()).join("annotations")
    }

    pub fn annotation_file(&self, split: SplitKind) -> PathBuf {
        self.annotations_dir(split)
            .join(format!("instances_{}.json", split.name()))
    }

    /// Creates all four output directories.
    pub fn create_dirs(&self) -> Result<(), Yolo2CocoError> {
        for split in [SplitKind::Train, SplitKind::Val] {
            fs::create_dir_all(self.images_dir(split)).map_err(Yolo2CocoError::Io)?;
            fs::create_dir_all(self.annotations_dir(split)).map_err(Yolo2CocoError::Io)?;
        }
        Ok(())
    }
}

/// Converts a YOLO dataset on disk into two COCO splits.
#[derive(Clone, Debug, Default)]
pub struct ConversionPipeline<P = ImagesizeProbe, C = FsCopier> {
    probe: P,
    copier: C,
    show_progress: bool,
}

impl ConversionPipeline {
    /// Pipeline with the filesystem collaborators and no progress output.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ImageProbe, C: FileCopier> ConversionPipeline<P, C> {
    pub fn with_collaborators(probe: P, copier: C) -> Self {
        Self {
            probe,
            copier,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Runs the full conversion.
    ///
    /// Fails before touching the output tree if the ratio is invalid or the
    /// class list cannot be loaded. An image that cannot be measured aborts
    /// the run; nothing is rolled back.
    pub fn run(&self, opts: &ConvertOptions) -> Result<ConversionReport, Yolo2CocoError> {
        validate_train_ratio(opts.train_ratio)?;

        let classes = ClassList::load(&opts.label_list)?;
        info!("Found {} classes: {:?}", classes.len(), classes.names());

        let image_files = collect_image_files(&opts.images_dir)?;
        info!("Found {} images", image_files.len());

        let layout = OutputLayout::new(&opts.output_dir);
        layout.create_dirs()?;

        let split = split_train_val(image_files, opts.train_ratio, opts.seed)?;
        info!(
            "Train images: {}, Val images: {}",
            split.train.len(),
            split.val.len()
        );

        let mut report = ConversionReport {
            classes: classes.names().to_vec(),
            discovered_images: split.len(),
            ..Default::default()
        };

        let categories = classes.categories();
        for (kind, images) in [(SplitKind::Train, &split.train), (SplitKind::Val, &split.val)] {
            let built = self.convert_split(
                kind,
                images,
                &classes,
                categories.clone(),
                &opts.labels_dir,
                &layout,
            )?;

            let annotation_file = layout.annotation_file(kind);
            write_coco_json(&annotation_file, &built.dataset)?;
            info!(
                "Wrote {} ({} images, {} annotations)",
                annotation_file.display(),
                built.summary.images,
                built.summary.annotations
            );

            report.splits.push(SplitSummary {
                annotation_file,
                ..built.summary
            });
            report.issues.extend(built.issues);
        }

        Ok(report)
    }

    /// Converts one split's images in the given order.
    ///
    /// Copies each image into the split's image directory but does not
    /// write the annotation file; the caller serializes the returned dataset.
    pub fn convert_split(
        &self,
        kind: SplitKind,
        images: &[PathBuf],
        classes: &ClassList,
        categories: Vec<CategoryRecord>,
        labels_dir: &Path,
        layout: &OutputLayout,
    ) -> Result<BuiltSplit, Yolo2CocoError> {
        let mut builder = DatasetBuilder::new(kind.name(), classes.len());
        let images_out = layout.images_dir(kind);
        let pb = create_progress_bar(
            images.len() as u64,
            &format!("Converting {} set", kind.name()),
            self.show_progress,
        );

        for image_path in images {
            let (width, height) = self.probe.dimensions(image_path)?;
            let file_name = image_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let image_id = builder.add_image(file_name.clone(), width, height);

            let label_path = label_path_for_image(image_path, labels_dir);
            let annotations = read_label_file(&label_path)?;
            debug!(
                "{}: {} label row(s) from {}",
                file_name,
                annotations.len(),
                label_path.display()
            );

            for ann in annotations {
                builder.add_annotation(image_id, ann.class_id, ann.bbox, width, height);
            }

            self.copier.copy(image_path, &images_out.join(&file_name))?;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(builder.finalize(categories))
    }
}

/// Runs the conversion with filesystem collaborators.
pub fn convert_dataset(
    opts: &ConvertOptions,
    show_progress: bool,
) -> Result<ConversionReport, Yolo2CocoError> {
    ConversionPipeline::new().show_progress(show_progress).run(opts)
}
