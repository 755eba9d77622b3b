fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 워크스페이스 루트의 proto/ 디렉토리
    let proto_root = "../../proto";
    let collector_proto = format!("{proto_root}/collector/v1/collector.proto");

    println!("cargo:rerun-if-changed={collector_proto}");
    println!("cargo:rerun-if-env-changed=LOGWIRE_REGEN_PROTO");

    // 기본 빌드는 src/proto 의 생성 파일을 사용 (protoc 불필요)
    if std::env::var_os("LOGWIRE_REGEN_PROTO").is_none() {
        return Ok(());
    }

    if !std::path::Path::new(&collector_proto).exists() {
        println!("cargo:warning=Proto source not found, using pre-generated file");
        return Ok(());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/proto")
        .compile_protos(&[&collector_proto], &[proto_root])?;

    Ok(())
}
