use crate::body::{BodyInputStream, ByteAccumulator};

/// The contract an object pool relies on to hand one instance to many requests.
///
/// `wrap` is called when the instance is checked out, `recycle` before it goes back.
/// The pool never touches an instance while it is checked out.
pub trait Recyclable {
    type Resource;

    fn wrap(&self, resource: Self::Resource);

    fn recycle(&self);
}

impl Recyclable for BodyInputStream {
    type Resource = ByteAccumulator;

    fn wrap(&self, resource: ByteAccumulator) {
        BodyInputStream::wrap(self, resource);
    }

    fn recycle(&self) {
        BodyInputStream::recycle(self);
    }
}
