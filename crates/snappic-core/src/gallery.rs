use std::collections::{HashMap, HashSet};

use crate::image::Image;
use crate::timer::TimerView;

/// A rendered gallery entry. `node_id` is assigned once when the entry is
/// created and survives every reconcile in which its filename stays listed.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    node_id: u64,
    image: Image,
    timer: TimerView,
}

impl GalleryItem {
    fn new(node_id: u64, image: Image) -> Self {
        let timer = TimerView::evaluate(image.age, image.state);
        Self {
            node_id,
            image,
            timer,
        }
    }

    fn update(&mut self, image: Image) {
        self.timer = TimerView::evaluate(image.age, image.state);
        self.image = image;
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn filename(&self) -> &str {
        &self.image.filename
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn timer(&self) -> &TimerView {
        &self.timer
    }
}

/// What a reconcile changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The set of images currently on screen, kept in insertion order.
#[derive(Debug, Default)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    next_node_id: u64,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the rendered set in line with a freshly fetched list.
    ///
    /// Entries whose filename is missing from `images` are dropped, entries
    /// still listed keep their node and get a new timer, and unseen
    /// filenames are appended in the order the backend returned them.
    /// Repeated filenames in `images` collapse to their first occurrence.
    pub fn reconcile(&mut self, images: Vec<Image>) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut seen = HashSet::new();
        let images: Vec<Image> = images
            .into_iter()
            .filter(|img| seen.insert(img.filename.clone()))
            .collect();

        self.items.retain(|item| {
            let keep = seen.contains(item.filename());
            if !keep {
                report.removed.push(item.filename().to_string());
            }
            keep
        });

        let index: HashMap<String, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.filename().to_string(), i))
            .collect();

        for image in images {
            match index.get(&image.filename) {
                Some(&i) => {
                    self.items[i].update(image);
                    report.updated += 1;
                }
                None => {
                    report.added.push(image.filename.clone());
                    let node_id = self.next_node_id;
                    self.next_node_id += 1;
                    self.items.push(GalleryItem::new(node_id, image));
                }
            }
        }

        report
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn get(&self, filename: &str) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.filename() == filename)
    }

    pub fn position(&self, filename: &str) -> Option<usize> {
        self.items.iter().position(|item| item.filename() == filename)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// When true the view shows its empty-state placeholder.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
