// Reference-counted messages and the incoming-delivery view embedded in them

use crate::Core::Connection::ConnId;
use crate::Loop::Structs::Header_Structs::{Header, MessageFlags};
use parking_lot::Mutex;
use std::fmt;
use std::io::IoSliceMut;
use std::net::IpAddr;
use std::sync::Arc;

/// Invoked once, when the last reference to a message is released.
pub type FreeHook = Box<dyn FnOnce(&Header) + Send + Sync>;

/// Addressing written into a message when it is handed to a receive path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IncomingInfo {
    pub conn: ConnId,
    pub saddr: IpAddr,
    pub daddr: IpAddr,
}

struct MessageInner {
    header: Header,
    segments: Vec<Box<[u8]>>,
    /// The incoming-delivery record. Lives in the same allocation as the
    /// message and is only written at delivery time.
    incoming: Mutex<Option<IncomingInfo>>,
    free_hook: Option<FreeHook>,
}

impl Drop for MessageInner {
    fn drop(&mut self) {
        if let Some(hook) = self.free_hook.take() {
            hook(&self.header);
        }
    }
}

/// A framed message shared between a sender and any number of receive paths.
///
/// Each `Message` value is one reference. [`Message::acquire`] takes another,
/// [`Message::release`] (or dropping the value) gives one back. The header and
/// payload segments never change after [`MessageBuilder::build`].
pub struct Message {
    inner: Arc<MessageInner>,
}

impl Message {
    pub fn builder(sequence: u64) -> MessageBuilder {
        MessageBuilder::new(sequence)
    }

    /// Take another reference to this message.
    pub fn acquire(&self) -> Message {
        Message {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Give this reference back. The free hook runs if it was the last one.
    pub fn release(self) {
        drop(self);
    }

    /// Current number of holders.
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn header(&self) -> &Header {
        &self.inner.header
    }

    pub fn segments(&self) -> &[Box<[u8]>] {
        &self.inner.segments
    }

    /// Whether two handles refer to the same message.
    pub fn ptr_eq(&self, other: &Message) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Bind the embedded incoming record to a connection and addresses.
    pub(crate) fn inc_init(&self, conn: ConnId, saddr: IpAddr, daddr: IpAddr) {
        *self.inner.incoming.lock() = Some(IncomingInfo { conn, saddr, daddr });
    }

    /// Take a reference in the form the receive path consumes.
    pub(crate) fn to_incoming(&self) -> IncomingDelivery {
        IncomingDelivery {
            message: self.acquire(),
        }
    }

    /// Copy up to `header.len` payload bytes into `iov`, segment by segment.
    /// Returns the number of bytes copied.
    pub fn copy_to_iovec(&self, iov: &mut [IoSliceMut<'_>]) -> usize {
        let mut budget = self.header().len as usize;
        let mut copied = 0;
        let mut vecs = iov.iter_mut();
        let mut dst: &mut [u8] = &mut [];

        for seg in self.segments() {
            if budget == 0 {
                break;
            }
            let mut src = &seg[..seg.len().min(budget)];
            budget -= src.len();

            while !src.is_empty() {
                while dst.is_empty() {
                    match vecs.next() {
                        Some(v) => dst = &mut v[..],
                        None => return copied,
                    }
                }
                let n = src.len().min(dst.len());
                let (head, tail) = std::mem::take(&mut dst).split_at_mut(n);
                head.copy_from_slice(&src[..n]);
                dst = tail;
                src = &src[n..];
                copied += n;
            }
        }
        copied
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_message(self, f)
    }
}

/// The receive-path view of a delivered message.
///
/// Holds one reference to the message it points into; dropping the record
/// (or passing it to the transport's `inc_free`) releases that reference.
pub struct IncomingDelivery {
    message: Message,
}

impl IncomingDelivery {
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn header(&self) -> &Header {
        self.message.header()
    }

    /// Addressing written at delivery time.
    ///
    /// `None` only for a record that was never handed to a receive path.
    pub fn info(&self) -> Option<IncomingInfo> {
        *self.message.inner.incoming.lock()
    }

    pub fn saddr(&self) -> Option<IpAddr> {
        self.info().map(|i| i.saddr)
    }

    pub fn daddr(&self) -> Option<IpAddr> {
        self.info().map(|i| i.daddr)
    }

    pub fn conn_id(&self) -> Option<ConnId> {
        self.info().map(|i| i.conn)
    }

    /// Another holder for the same delivery, e.g. to park it on a queue.
    pub fn acquire(&self) -> IncomingDelivery {
        IncomingDelivery {
            message: self.message.acquire(),
        }
    }

    pub fn release(self) {
        self.message.release();
    }
}

impl fmt::Debug for IncomingDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingDelivery")
            .field("sequence", &self.header().sequence)
            .field("info", &self.info())
            .finish()
    }
}

/// Builds a [`Message`] with a single initial reference.
pub struct MessageBuilder {
    header: Header,
    explicit_len: Option<u32>,
    segments: Vec<Box<[u8]>>,
    free_hook: Option<FreeHook>,
}

impl MessageBuilder {
    pub fn new(sequence: u64) -> Self {
        Self {
            header: Header {
                sequence,
                ..Header::default()
            },
            explicit_len: None,
            segments: Vec::new(),
            free_hook: None,
        }
    }

    pub fn flags(mut self, flags: MessageFlags) -> Self {
        self.header.flags = flags;
        self
    }

    /// Declared payload length. Defaults to the sum of the segment lengths.
    pub fn len(mut self, len: u32) -> Self {
        self.explicit_len = Some(len);
        self
    }

    pub fn segment<T: Into<Box<[u8]>>>(mut self, data: T) -> Self {
        self.segments.push(data.into());
        self
    }

    pub fn free_hook<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Header) + Send + Sync + 'static,
    {
        self.free_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Message {
        let mut header = self.header;
        header.len = self.explicit_len.unwrap_or_else(|| {
            self.segments.iter().map(|s| s.len() as u32).sum()
        });

        Message {
            inner: Arc::new(MessageInner {
                header,
                segments: self.segments,
                incoming: Mutex::new(None),
                free_hook: self.free_hook,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn release_of_last_reference_runs_free_hook_once() {
        let frees = Arc::new(AtomicUsize::new(0));
        let counter = frees.clone();
        let rm = Message::builder(7)
            .segment(vec![1u8, 2, 3])
            .free_hook(move |hdr| {
                assert_eq!(hdr.sequence, 7);
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        let extra = rm.acquire();
        assert_eq!(rm.refcount(), 2);
        extra.release();
        assert_eq!(frees.load(Ordering::SeqCst), 0);
        rm.release();
        assert_eq!(frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn copy_spans_segments_and_vectors() {
        let rm = Message::builder(1)
            .segment(vec![1u8, 2, 3])
            .segment(vec![4u8, 5])
            .build();

        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        let mut iov = [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)];
        assert_eq!(rm.copy_to_iovec(&mut iov), 5);
        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4, 5, 0]);
    }

    #[test]
    fn copy_stops_at_declared_length() {
        let rm = Message::builder(1)
            .segment(vec![9u8; 8])
            .len(3)
            .build();

        let mut buf = [0u8; 8];
        let mut iov = [IoSliceMut::new(&mut buf)];
        assert_eq!(rm.copy_to_iovec(&mut iov), 3);
        assert_eq!(&buf[..4], &[9, 9, 9, 0]);
    }
}
