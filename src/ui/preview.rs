/// Image handles for the session's images
///
/// Building a handle from bytes gives it a new id, which makes iced decode
/// the image again. The cache keeps one handle per payload and only
/// rebuilds it when the session points at a different buffer.

use iced::widget::image::Handle;

use crate::state::{EditSession, EncodedImage};

#[derive(Debug, Default)]
struct Slot {
    image: Option<EncodedImage>,
    handle: Option<Handle>,
}

impl Slot {
    fn sync(&mut self, image: Option<&EncodedImage>) {
        match (image, &self.image) {
            (Some(new), Some(old)) if new.same_payload(old) => {}
            (Some(new), _) => {
                self.handle = Some(Handle::from_bytes(new.bytes().to_vec()));
                self.image = Some(new.clone());
            }
            (None, _) => {
                self.image = None;
                self.handle = None;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PreviewCache {
    source: Slot,
    reference: Slot,
    result: Slot,
}

impl PreviewCache {
    /// Bring the handles in line with the session
    pub fn sync(&mut self, session: &EditSession) {
        self.source.sync(session.source());
        self.reference.sync(session.reference());
        self.result.sync(session.result());
    }

    pub fn source(&self) -> Option<&Handle> {
        self.source.handle.as_ref()
    }

    pub fn reference(&self) -> Option<&Handle> {
        self.reference.handle.as_ref()
    }

    pub fn result(&self) -> Option<&Handle> {
        self.result.handle.as_ref()
    }
}
