//! Resumable reading tests against a scripted in-memory object client.
//!
//! The mock serves a deterministic object in small transport frames and can
//! break a response after a chosen number of bytes, which is how connection
//! drops are injected.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use aisread::{
    Error, Headers, ObjectClient, ObjectReader, ObjectResponse, ObjectStream, ReaderOptions,
    Result,
};
use bytes::Bytes;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy)]
enum Fault {
    /// Serve the body, then break after this many bytes of it.
    BreakAfter(usize),
    /// Fail the GET itself with a connection error.
    Refuse,
}

#[derive(Default)]
struct Script {
    faults:       VecDeque<Fault>,
    always:       Option<Fault>,
    missing:      bool,
    gets:         Vec<u64>,
    heads:        usize,
    checksum_hex: Option<String>,
}

#[derive(Clone)]
struct MockClient {
    data:   Arc<Vec<u8>>,
    frame:  usize,
    script: Arc<Mutex<Script>>,
}

impl MockClient {
    fn new(len: usize) -> Self {
        Self {
            data:   Arc::new((0..len).map(|i| (i * 7 % 256) as u8).collect()),
            frame:  1000,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }

    fn fault(self, fault: Fault) -> Self {
        self.script.lock().unwrap().faults.push_back(fault);
        self
    }

    fn always(self, fault: Fault) -> Self {
        self.script.lock().unwrap().always = Some(fault);
        self
    }

    fn missing(self) -> Self {
        self.script.lock().unwrap().missing = true;
        self
    }

    fn checksum(self, hex: impl Into<String>) -> Self {
        self.script.lock().unwrap().checksum_hex = Some(hex.into());
        self
    }

    fn gets(&self) -> Vec<u64> { self.script.lock().unwrap().gets.clone() }

    fn heads(&self) -> usize { self.script.lock().unwrap().heads }

    fn headers(&self, len: usize) -> Headers {
        let checksum = self
            .script
            .lock()
            .unwrap()
            .checksum_hex
            .clone()
            .unwrap_or_else(|| hex::encode(Sha256::digest(self.data.as_slice())));
        vec![
            ("Content-Length".to_string(), len.to_string()),
            ("ais-checksum-type".to_string(), "sha256".to_string()),
            ("ais-checksum-value".to_string(), checksum),
            ("ais-version".to_string(), "3".to_string()),
            ("ais-custom-md".to_string(), "owner=ml,stage=train".to_string()),
        ]
    }
}

impl ObjectClient for MockClient {
    async fn get(&self, start: u64) -> Result<ObjectResponse> {
        let fault = {
            let mut script = self.script.lock().unwrap();
            script.gets.push(start);
            if script.missing {
                return Err(Error::NotFound("bck/obj".to_string()));
            }
            script.faults.pop_front().or(script.always)
        };

        let tail = &self.data[start as usize..];
        let limit = match fault {
            Some(Fault::Refuse) => return Err(Error::Transport("connection refused".to_string())),
            Some(Fault::BreakAfter(n)) => n.min(tail.len()),
            None => tail.len(),
        };

        let mut items: Vec<Result<Bytes>> = tail[..limit]
            .chunks(self.frame)
            .map(|frame| Ok(Bytes::copy_from_slice(frame)))
            .collect();
        if limit < tail.len() {
            items.push(Err(Error::Transport("connection reset by peer".to_string())));
        }

        Ok(ObjectResponse {
            status:  if start == 0 { 200 } else { 206 },
            headers: self.headers(tail.len()),
            body:    Box::pin(futures_util::stream::iter(items)),
        })
    }

    async fn head(&self) -> Result<Headers> {
        let mut script = self.script.lock().unwrap();
        if script.missing {
            return Err(Error::NotFound("bck/obj".to_string()));
        }
        script.heads += 1;
        drop(script);
        Ok(self.headers(self.data.len()))
    }
}

fn reader(client: &MockClient, chunk_size: usize) -> ObjectReader<MockClient> {
    ObjectReader::new(client.clone(), ReaderOptions::default().chunk_size(chunk_size)).unwrap()
}

#[tokio::test]
async fn position_tracks_delivered_bytes() {
    let client = MockClient::new(10_000).frame(333);
    let mut file = reader(&client, 1024).as_file(None);

    let mut delivered = 0u64;
    for size in [1, 0, 17, 1024, 4000, 9999] {
        let before = file.tell().unwrap();
        let data = file.read(Some(size)).await.unwrap();
        delivered += data.len() as u64;
        assert_eq!(file.tell().unwrap(), delivered);
        assert!(file.tell().unwrap() >= before);
    }
    assert_eq!(delivered, 10_000);
}

#[tokio::test]
async fn any_read_pattern_yields_the_same_bytes() {
    let client = MockClient::new(12_345).frame(777);
    let expected = client.data.as_slice().to_vec();

    for chunk_size in [1, 7, 4096, 50_000] {
        let mut whole = reader(&client, chunk_size).as_file(None);
        assert_eq!(whole.read(None).await.unwrap(), expected);

        for read_size in [1, 13, 1000, 20_000] {
            let mut file = reader(&client, chunk_size).as_file(None);
            let mut out = Vec::new();
            loop {
                let data = file.read(Some(read_size)).await.unwrap();
                if data.is_empty() {
                    break;
                }
                out.extend_from_slice(&data);
            }
            assert_eq!(out, expected, "chunk {chunk_size}, read {read_size}");
        }
    }
}

#[tokio::test]
async fn short_read_only_at_end_of_object() {
    let client = MockClient::new(100).frame(10);
    let mut file = reader(&client, 16).as_file(None);

    assert_eq!(file.read(Some(70)).await.unwrap().len(), 70);
    assert_eq!(file.read(Some(70)).await.unwrap().len(), 30);
    assert!(file.read(Some(70)).await.unwrap().is_empty());
    assert!(file.read(None).await.unwrap().is_empty());
    assert_eq!(file.tell().unwrap(), 100);
}

#[tokio::test]
async fn resume_reopens_at_delivered_offset() {
    let client = MockClient::new(5000).frame(500).fault(Fault::BreakAfter(3000));
    let mut file = reader(&client, 1000).as_file(Some(3));

    let mut out = Vec::new();
    for _ in 0..3 {
        out.extend_from_slice(&file.read(Some(1000)).await.unwrap());
    }
    assert_eq!(file.tell().unwrap(), 3000);
    out.extend_from_slice(&file.read(None).await.unwrap());

    assert_eq!(out, client.data.as_slice());
    assert_eq!(client.gets(), vec![0, 3000]);
    assert_eq!(file.resume_count(), 1);
}

#[tokio::test]
async fn resume_discards_undelivered_buffer() {
    // 12,000-byte object, 4 KiB chunks; the first response breaks at byte 10,000,
    // while 8,192 bytes are fetched but only 6,000 delivered.
    let client = MockClient::new(12_000).frame(1000).fault(Fault::BreakAfter(10_000));
    let mut file = reader(&client, 4096).as_file(Some(5));

    let first = file.read(Some(6000)).await.unwrap();
    assert_eq!(first, &client.data[..6000]);
    assert_eq!(client.gets(), vec![0]);

    let rest = file.read(None).await.unwrap();
    assert_eq!(rest, &client.data[6000..]);
    assert_eq!(client.gets(), vec![0, 6000]);
    assert_eq!(file.tell().unwrap(), 12_000);
    assert_eq!(file.resume_count(), 1);
}

#[tokio::test]
async fn failed_open_is_resumed() {
    let client = MockClient::new(2048).fault(Fault::Refuse);
    let mut file = reader(&client, 512).as_file(None);

    assert_eq!(file.read(None).await.unwrap(), client.data.as_slice());
    assert_eq!(client.gets(), vec![0, 0]);
    assert_eq!(file.resume_count(), 1);
}

#[tokio::test]
async fn resume_budget_accumulates_across_reads() {
    let client = MockClient::new(4000)
        .frame(100)
        .fault(Fault::BreakAfter(1000))
        .fault(Fault::BreakAfter(1000));
    let mut file = reader(&client, 500).as_file(Some(2));

    let mut out = Vec::new();
    out.extend_from_slice(&file.read(Some(1000)).await.unwrap());
    out.extend_from_slice(&file.read(Some(1000)).await.unwrap());
    assert_eq!(file.resume_count(), 1);
    out.extend_from_slice(&file.read(Some(1000)).await.unwrap());
    assert_eq!(file.resume_count(), 2);
    out.extend_from_slice(&file.read(None).await.unwrap());

    assert_eq!(out, client.data.as_slice());
    assert_eq!(client.gets(), vec![0, 1000, 2000]);
}

#[tokio::test]
async fn resume_exhaustion_is_terminal() {
    let client = MockClient::new(1000).frame(50).always(Fault::BreakAfter(100));
    let mut file = reader(&client, 64).as_file(Some(2));

    match file.read(None).await {
        Err(Error::ResumeExhausted { attempts, last_error }) => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("connection reset"));
        }
        other => panic!("expected resume exhaustion, got {other:?}"),
    }
    assert_eq!(client.gets(), vec![0, 0, 0]);

    for _ in 0..3 {
        assert!(matches!(
            file.read(Some(10)).await,
            Err(Error::ResumeExhausted { attempts: 2, .. })
        ));
    }
    assert_eq!(client.gets().len(), 3, "no silent retries after exhaustion");
    assert_eq!(file.tell().unwrap(), 0);
    file.close().unwrap();
}

#[tokio::test]
async fn exhaustion_keeps_already_delivered_bytes_valid() {
    let client = MockClient::new(1000)
        .frame(100)
        .fault(Fault::BreakAfter(300))
        .fault(Fault::BreakAfter(0));
    let mut file = reader(&client, 100).as_file(Some(1));

    let first = file.read(Some(300)).await.unwrap();
    assert_eq!(first, &client.data[..300]);
    assert!(matches!(file.read(Some(1)).await, Err(Error::ResumeExhausted { .. })));
    assert_eq!(file.tell().unwrap(), 300);
    assert_eq!(client.gets(), vec![0, 300]);
}

#[tokio::test]
async fn zero_budget_fails_on_first_disconnect() {
    let client = MockClient::new(1000).fault(Fault::BreakAfter(10));
    let mut file = reader(&client, 64).as_file(Some(0));

    assert!(matches!(
        file.read(None).await,
        Err(Error::ResumeExhausted { attempts: 0, .. })
    ));
    assert_eq!(client.gets(), vec![0]);
}

#[tokio::test]
async fn not_found_consumes_no_budget() {
    let client = MockClient::new(10).missing();
    let mut file = reader(&client, 4).as_file(Some(3));

    assert!(matches!(file.read(Some(4)).await, Err(Error::NotFound(_))));
    assert_eq!(file.resume_count(), 0);
    assert_eq!(client.gets(), vec![0]);

    assert!(matches!(file.read(None).await, Err(Error::NotFound(_))));
    assert_eq!(file.resume_count(), 0);
    assert_eq!(client.gets(), vec![0, 0]);
}

#[tokio::test]
async fn closed_file_rejects_everything() {
    let client = MockClient::new(100);
    let mut file = reader(&client, 16).as_file(None);

    assert!(file.readable());
    assert!(!file.seekable());
    file.read(Some(10)).await.unwrap();
    file.close().unwrap();

    assert!(!file.readable());
    assert!(!file.seekable());
    assert!(matches!(file.read(Some(1)).await, Err(Error::Closed)));
    assert!(matches!(file.read(Some(0)).await, Err(Error::Closed)));
    assert!(matches!(file.read(None).await, Err(Error::Closed)));
    assert!(matches!(file.tell(), Err(Error::Closed)));
    assert!(matches!(file.close(), Err(Error::Closed)));
}

#[tokio::test]
async fn zero_length_read_opens_nothing() {
    let client = MockClient::new(100);
    let mut file = reader(&client, 16).as_file(None);

    assert!(file.read(Some(0)).await.unwrap().is_empty());
    assert!(client.gets().is_empty());
    assert_eq!(file.tell().unwrap(), 0);

    file.read(Some(1)).await.unwrap();
    assert!(file.read(Some(0)).await.unwrap().is_empty());
    assert_eq!(client.gets(), vec![0]);
}

#[tokio::test]
async fn resume_backoff_delays_reopen() {
    let client = MockClient::new(100).fault(Fault::BreakAfter(10));
    let options = ReaderOptions::default()
        .chunk_size(16)
        .resume_backoff(std::time::Duration::from_millis(20));
    let mut file = ObjectReader::new(client.clone(), options).unwrap().as_file(None);

    let started = std::time::Instant::now();
    assert_eq!(file.read(None).await.unwrap(), client.data.as_slice());
    assert!(started.elapsed() >= std::time::Duration::from_millis(20));
}

#[tokio::test]
async fn attributes_are_memoized_until_refreshed() {
    let client = MockClient::new(64);
    let mut reader = reader(&client, 16);

    assert!(reader.cached_attributes().is_none());
    let attrs = reader.attributes().await.unwrap().clone();
    assert_eq!(attrs.size, Some(64));
    assert_eq!(attrs.version, "3");
    assert_eq!(attrs.custom_metadata.get("owner").map(String::as_str), Some("ml"));

    reader.attributes().await.unwrap();
    assert_eq!(client.heads(), 1);

    reader.head().await.unwrap();
    assert_eq!(client.heads(), 2);
    assert!(client.gets().is_empty());
}

#[tokio::test]
async fn props_refresh_attributes() {
    let client = MockClient::new(64);
    let mut reader = reader(&client, 16);

    let props = reader.props().await.unwrap();
    assert_eq!(props.attributes.size, Some(64));
    assert_eq!(reader.cached_attributes(), Some(&props.attributes));
}

#[tokio::test]
async fn read_all_replaces_attributes_and_validates() {
    let client = MockClient::new(5000).frame(300);
    let options = ReaderOptions::default().validate_checksum(true);
    let mut reader = ObjectReader::new(client.clone(), options).unwrap();

    let data = reader.read_all().await.unwrap();
    assert_eq!(data, client.data.as_slice());
    assert_eq!(reader.cached_attributes().unwrap().size, Some(5000));
    assert_eq!(client.heads(), 0);
    assert_eq!(client.gets(), vec![0]);
}

#[tokio::test]
async fn read_all_detects_corruption() {
    let client = MockClient::new(500).checksum(hex::encode([0u8; 32]));
    let options = ReaderOptions::default().validate_checksum(true);
    let mut reader = ObjectReader::new(client.clone(), options).unwrap();

    assert!(matches!(reader.read_all().await, Err(Error::Verification(_))));

    let mut unchecked = ObjectReader::new(client.clone(), ReaderOptions::default()).unwrap();
    assert_eq!(unchecked.read_all().await.unwrap().len(), 500);
}

#[tokio::test]
async fn read_all_does_not_resume() {
    let client = MockClient::new(500).fault(Fault::BreakAfter(100));
    let mut reader = reader(&client, 64);

    assert!(matches!(reader.read_all().await, Err(Error::Transport(_))));
    assert_eq!(client.gets(), vec![0]);
}

#[tokio::test]
async fn raw_exposes_transport_frames() {
    let client = MockClient::new(2500).frame(1000);
    let mut reader = reader(&client, 64);

    let frames: Vec<Bytes> = reader
        .raw()
        .await
        .unwrap()
        .map(|frame| frame.unwrap())
        .collect()
        .await;
    let sizes: Vec<usize> = frames.iter().map(Bytes::len).collect();
    assert_eq!(sizes, vec![1000, 1000, 500]);
    assert!(reader.cached_attributes().is_some());
}

#[tokio::test]
async fn chunk_stream_has_fixed_boundaries() {
    let client = MockClient::new(2500).frame(333);
    let reader = reader(&client, 1024);

    let chunks: Vec<Bytes> = reader.chunks().map(|chunk| chunk.unwrap()).collect().await;
    let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
    assert_eq!(sizes, vec![1024, 1024, 452]);
    assert_eq!(chunks.concat(), client.data.as_slice());

    let mut tail = reader.iter_from(2000);
    let chunk = tail.next_chunk().await.unwrap().unwrap();
    assert_eq!(chunk, &client.data[2000..]);
    assert!(tail.next_chunk().await.is_none());
}

#[tokio::test]
async fn invalid_options_rejected_up_front() {
    let client = MockClient::new(10);
    let result = ObjectReader::new(client.clone(), ReaderOptions::default().chunk_size(0));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(client.gets().is_empty());
}
