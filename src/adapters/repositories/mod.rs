mod dynamo_metadata_repository;

pub use dynamo_metadata_repository::DynamoMetadataRepository;
