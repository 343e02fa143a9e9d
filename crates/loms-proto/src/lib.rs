tonic::include_proto!("loms");
