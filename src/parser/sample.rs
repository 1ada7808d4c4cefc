/// Small four-node log used by the "test data" import.
///
/// The first line carries no node and is dropped on load.
pub const SAMPLE_LOG: &str = r#"{"caller":"main.go:170","lvl":"dbug","module":"contest","msg":"starting","policy":{"total":4,"threshold":3,"timeout_wait_seal":3000000000},"t":"2019-05-15T00:49:48.539189+09:00"}
{"caller":"main.go:178","count":0,"lvl":"warn","module":"contest","msg":"node created","node":"GAEU.6BSA","t":"2019-05-15T00:49:48.541063+09:00"}
{"caller":"main.go:178","count":1,"lvl":"info","module":"contest","msg":"node created","node":"GDJ7.M4FG","t":"2019-05-15T00:49:48.542382+09:00"}
{"caller":"main.go:178","count":2,"lvl":"eror","module":"contest","msg":"node created","node":"GDZH.X5S3","t":"2019-05-15T00:49:48.543672+09:00"}
{"caller":"main.go:178","count":3,"lvl":"crit","module":"contest","msg":"node created","node":"GCHI.OEDQ","t":"2019-05-15T00:49:48.545367+09:00"}
{"caller":"main.go:213","lvl":"info","module":"state","msg":"node state","node":"GAEU.6BSA","node-state":"booting","t":"2019-05-15T00:49:48.545571+09:00"}
{"caller":"main.go:213","lvl":"info","module":"state","msg":"node state","node":"GDJ7.M4FG","node-state":"booting","t":"2019-05-15T00:49:48.545705+09:00"}
{"caller":"main.go:213","lvl":"info","module":"state","msg":"node state","node":"GDZH.X5S3","node-state":"booting","t":"2019-05-15T00:49:48.545811+09:00"}
{"caller":"main.go:213","lvl":"info","module":"state","msg":"node state","node":"GCHI.OEDQ","node-state":"booting","t":"2019-05-15T00:49:48.545935+09:00"}
{"caller":"ballot.go:88","lvl":"dbug","module":"ballot","msg":"ballot signed","node":"GAEU.6BSA","height":1,"round":0,"t":"2019-05-15T00:49:49.102030+09:00"}
{"caller":"ballot.go:88","lvl":"dbug","module":"ballot","msg":"ballot signed","node":"GDJ7.M4FG","height":1,"round":0,"t":"2019-05-15T00:49:49.104480+09:00"}
{"caller":"ballot.go:131","lvl":"warn","module":"ballot","msg":"ballot timeout","node":"GAEU.6BSA","height":1,"round":0,"t":"2019-05-15T00:49:52.104480+09:00"}
"#;
