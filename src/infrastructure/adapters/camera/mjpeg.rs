//! MJPEG 帧切分
//!
//! `multipart/x-mixed-replace` 流里每个分段是一张完整 JPEG，
//! 这里不解析分段头，直接按 SOI (FFD8) / EOI (FFD9) 标记切分。

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// 单帧最大字节数，超过时丢弃缓冲区
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug)]
pub struct MjpegSplitter {
    buffer: Vec<u8>,
    max_frame_bytes: usize,
}

impl MjpegSplitter {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_limit(max_frame_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_bytes,
        }
    }

    /// 追加一段数据，返回其中已完整的帧
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        loop {
            let Some(start) = find_marker(&self.buffer, SOI) else {
                // 末尾的 0xFF 可能是下一个 SOI 的前半
                let keep = usize::from(self.buffer.last() == Some(&0xFF));
                let cut = self.buffer.len() - keep;
                self.buffer.drain(..cut);
                break;
            };
            if start > 0 {
                self.buffer.drain(..start);
            }

            match find_marker(&self.buffer[SOI.len()..], EOI) {
                Some(offset) => {
                    let end = SOI.len() + offset + EOI.len();
                    frames.push(self.buffer.drain(..end).collect());
                }
                None => {
                    if self.buffer.len() > self.max_frame_bytes {
                        tracing::warn!(
                            buffered = self.buffer.len(),
                            "MJPEG frame exceeds limit, dropping buffer"
                        );
                        self.buffer.clear();
                    }
                    break;
                }
            }
        }

        frames
    }

    /// 尚未组成完整帧的字节数
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for MjpegSplitter {
    fn default() -> Self {
        Self::new()
    }
}

fn find_marker(haystack: &[u8], marker: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|window| window == marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(jpeg: &[u8]) -> Vec<u8> {
        let mut out = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        out.extend_from_slice(jpeg);
        out.extend_from_slice(b"\r\n");
        out
    }

    #[test]
    fn test_splits_consecutive_parts() {
        let a = [0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9];
        let b = [0xFF, 0xD8, 9, 0xFF, 0xD9];
        let mut stream = part(&a);
        stream.extend(part(&b));

        let mut splitter = MjpegSplitter::new();
        let frames = splitter.push(&stream);
        assert_eq!(frames, vec![a.to_vec(), b.to_vec()]);
    }

    #[test]
    fn test_frame_across_chunks() {
        let jpeg = [0xFF, 0xD8, 7, 7, 7, 0xFF, 0xD9];
        let stream = part(&jpeg);
        let mut splitter = MjpegSplitter::new();

        let mut frames = Vec::new();
        for chunk in stream.chunks(3) {
            frames.extend(splitter.push(chunk));
        }
        assert_eq!(frames, vec![jpeg.to_vec()]);
    }

    #[test]
    fn test_marker_split_between_chunks() {
        let mut splitter = MjpegSplitter::new();
        assert!(splitter.push(&[b'x', 0xFF]).is_empty());
        assert_eq!(splitter.buffered(), 1);
        assert!(splitter.push(&[0xD8, 5, 0xFF]).is_empty());
        assert_eq!(splitter.push(&[0xD9]), vec![vec![0xFF, 0xD8, 5, 0xFF, 0xD9]]);
        assert_eq!(splitter.buffered(), 0);
    }

    #[test]
    fn test_oversized_frame_is_dropped() {
        let mut splitter = MjpegSplitter::with_limit(8);
        assert!(splitter.push(&[0xFF, 0xD8, 0, 0, 0, 0, 0, 0, 0, 0]).is_empty());
        assert_eq!(splitter.buffered(), 0);
    }
}
