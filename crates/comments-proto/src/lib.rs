tonic::include_proto!("comments");
