//! Model contract, ONNX backend, the inference gateway and evaluation

pub mod evaluation;
pub mod gateway;
pub mod loader;
pub mod model;
pub mod onnx;

pub use evaluation::EvaluationReport;
pub use gateway::InferenceGateway;
pub use loader::ModelLoader;
pub use model::FraudModel;
pub use onnx::OnnxModel;
