//! 라인 스캐너: 파일 내용 스트림에서 매칭 라인 추출
//!
//! 바이트 단위로 `\n`을 기준으로 라인을 나누고, 라인 끝의 `\r`을 제거한 뒤
//! 잘못된 UTF-8은 대체 문자로 바꿔 패턴과 비교합니다. 매칭 라인의 순서는
//! 원본 파일 순서를 따릅니다.
//!
//! 최대 크기를 넘는 내용은 읽지 않습니다. 한계에 걸친 마지막 라인은
//! 잘린 상태로 비교됩니다.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use reposcan_core::pattern::PatternMatcher;

/// 라인 스캔 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScan {
    /// 매칭된 라인 (원본 순서)
    pub lines: Vec<String>,
    /// 최대 크기 때문에 끝까지 읽지 못했는지 여부
    pub truncated: bool,
}

/// 스트림의 각 라인을 `matcher`로 검사합니다.
pub async fn scan_lines<R>(
    reader: R,
    matcher: &PatternMatcher,
    max_bytes: u64,
) -> std::io::Result<LineScan>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(max_bytes));
    let mut buf = Vec::new();
    let mut lines = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if let Some(line) = match_line(&buf, matcher) {
            lines.push(line);
        }
    }

    // 한계까지 읽었으면 남은 내용이 있는지 한 바이트만 확인
    let limited = reader.into_inner();
    let truncated = if limited.limit() == 0 {
        let mut next_byte = [0u8; 1];
        limited.into_inner().read(&mut next_byte).await? > 0
    } else {
        false
    };

    Ok(LineScan { lines, truncated })
}

/// 라인 하나를 정규화하고 매칭되면 반환합니다.
pub fn match_line(raw: &[u8], matcher: &PatternMatcher) -> Option<String> {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = String::from_utf8_lossy(line);
    matcher.matches(&text).then(|| text.into_owned())
}
