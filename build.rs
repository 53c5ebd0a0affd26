fn main() -> std::io::Result<()> {
    let mut protobuf_out = std::path::PathBuf::new();
    protobuf_out.push(std::env::var("OUT_DIR").unwrap());
    protobuf_out.push("protobuf");
    std::fs::create_dir_all(&protobuf_out)?;
    prost_build::Config::new()
        .out_dir(&protobuf_out)
        .compile_protos(&["proto/gtfs-realtime.proto"], &["proto/"])?;
    Ok(())
}
