pub mod remote_oracle;
pub mod vision_oracle;
