/// One way of delivering a request body: `total` bytes split into chunks of `chunk_size`.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    chunk_size: usize,
    total: usize,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, chunk_size: usize, total: usize) -> Self {
        Self { name, group, chunk_size, total }
    }

    pub fn small(name: &'static str, chunk_size: usize) -> Self {
        Self::new(name, TestGroup::Small, chunk_size, 4 * 1024)
    }

    pub fn normal(name: &'static str, chunk_size: usize) -> Self {
        Self::new(name, TestGroup::Normal, chunk_size, 256 * 1024)
    }

    pub fn large(name: &'static str, chunk_size: usize) -> Self {
        Self::new(name, TestGroup::Large, chunk_size, 8 * 1024 * 1024)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// The body content cut into the chunks the transport would deliver.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        let body: Vec<u8> = (0..self.total).map(|i| (i % 251) as u8).collect();
        body.chunks(self.chunk_size.max(1)).map(<[u8]>::to_vec).collect()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}
