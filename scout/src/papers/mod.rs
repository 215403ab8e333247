mod arxiv;
mod huggingface;
mod pdf;

pub use arxiv::ArxivClient;
pub use huggingface::HuggingFaceClient;
pub use pdf::read_pdf;

#[cfg(test)]
pub(crate) use pdf::fixtures;
