use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static WORKBOOK_READS: Cell<u64> = Cell::new(0);
    static WORKBOOK_WRITES: Cell<u64> = Cell::new(0);
}

/// 记录一次工作簿读取 (基准工作簿按产品重复读取,是主要耗时)
pub fn record_workbook_read() {
    WORKBOOK_READS.with(|c| c.set(c.get().saturating_add(1)));
}

/// 记录一次工作簿写出
pub fn record_workbook_write() {
    WORKBOOK_WRITES.with(|c| c.set(c.get().saturating_add(1)));
}

/// 当前线程累计 (读取数, 写出数)
pub fn workbook_io_counts() -> (u64, u64) {
    (
        WORKBOOK_READS.with(|c| c.get()),
        WORKBOOK_WRITES.with(|c| c.get()),
    )
}

/// 性能统计 Guard：记录 elapsed_ms + 工作簿读取数 + 写出数
///
/// 使用方式：
/// ```ignore
/// let _perf = ratesheet_engine::perf::PerfGuard::new("generate");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    reads_start: u64,
    writes_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let (reads_start, writes_start) = workbook_io_counts();
        Self {
            op,
            start: Instant::now(),
            reads_start,
            writes_start,
        }
    }

    /// 自 Guard 创建以来的 (读取数, 写出数)
    pub fn io_counts(&self) -> (u64, u64) {
        let (reads, writes) = workbook_io_counts();
        (
            reads.saturating_sub(self.reads_start),
            writes.saturating_sub(self.writes_start),
        )
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let (workbook_reads, workbook_writes) = self.io_counts();
        let depth = PERF_DEPTH.with(|d| d.get());

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            workbook_reads,
            workbook_writes,
            depth,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
